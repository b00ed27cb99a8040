use clap::Parser;
use std::process;
use std::time::Duration;

use echoprobe::{EventSink, ProbeFailure, ProbeReport, Prober, Statistics};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Host name or IP address to probe
    address: String,

    /// Number of echo requests to send (0 = run until interrupted)
    #[arg(short, long, default_value_t = 4)]
    count: u64,

    /// Seconds to wait between requests
    #[arg(short, long, default_value_t = 1.0)]
    interval: f64,

    /// Seconds to wait for each reply
    #[arg(short = 'W', long, default_value_t = 1.0)]
    timeout: f64,

    /// Payload size in bytes
    #[arg(short, long, default_value_t = 32)]
    size: usize,
}

struct ConsoleSink {
    target: String,
    payload_size: usize,
}

impl EventSink for ConsoleSink {
    fn on_start(&mut self) {
        println!("PING {} with {} bytes of data:", self.target, self.payload_size);
    }

    fn on_recv(&mut self, reply: &ProbeReport) {
        println!(
            "Reply from {}: icmp_seq={} ttl={} time={:.1}ms",
            self.target,
            reply.sequence,
            reply.ttl,
            reply.rtt.as_secs_f64() * 1000.0
        );
    }

    fn on_timeout(&mut self, failure: &ProbeFailure) {
        println!("Request timed out: {}", failure);
    }

    fn on_finish(&mut self, stats: &Statistics) {
        println!();
        println!("--- {} ping statistics ---", self.target);
        println!(
            "{} packets transmitted, {} received, {:.0}% packet loss",
            stats.packets_sent(),
            stats.packets_recv(),
            stats.loss_percent()
        );
        if let (Some(shortest), Some(average), Some(longest)) =
            (stats.shortest_rtt(), stats.average_rtt(), stats.longest_rtt())
        {
            println!(
                "rtt min/avg/max = {:.1}/{:.1}/{:.1} ms",
                shortest.as_secs_f64() * 1000.0,
                average.as_secs_f64() * 1000.0,
                longest.as_secs_f64() * 1000.0
            );
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut prober = match Prober::new(&args.address) {
        Ok(prober) => prober,
        Err(e) => {
            eprintln!("echoprobe: {}", e);
            process::exit(1);
        }
    };
    prober.count = args.count;
    prober.interval = Duration::from_secs_f64(args.interval);
    prober.timeout = Duration::from_secs_f64(args.timeout);
    prober.payload_size = args.size;
    prober.set_sink(ConsoleSink {
        target: prober.target_ip().to_string(),
        payload_size: args.size,
    });

    let token = prober.cancel_token();
    ctrlc::set_handler(move || token.cancel()).expect("failed to set Ctrl-C handler");

    if let Err(e) = prober.run() {
        eprintln!("echoprobe: {}", e);
        process::exit(1);
    }
}
