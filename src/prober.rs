//! The per-target probe loop: send, await, classify, sleep.

use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use pnet::packet::icmp::IcmpTypes;

use crate::dns_resolver::{self, AddrFamily};
use crate::error::ProbeError;
use crate::events::{EventSink, NopSink, ProbeFailure, ProbeReport};
use crate::packet::{self, DEFAULT_PAYLOAD_SIZE};
use crate::stats::Statistics;
use crate::transport::{ProbeTransport, RawTransport};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_COUNT: u64 = 4;

// granularity of the cancellation check during the interval sleep
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Requests cancellation of a running probe series.
///
/// Cloneable and cheap to share; `cancel()` takes effect at the next loop
/// check, interrupting an in-progress interval sleep.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// ICMP echo prober for a single target.
///
/// Construction resolves the target and fails fast when it cannot be
/// resolved. Configuration fields may be adjusted freely before [`run`],
/// which then drives the whole series to completion on the calling thread.
///
/// [`run`]: Prober::run
pub struct Prober {
    /// Wait between probes. Default 1s.
    pub interval: Duration,
    /// Per-probe reply deadline. Default 1s.
    pub timeout: Duration,
    /// Number of probes to send; 0 means run until cancelled. Default 4.
    pub count: u64,
    /// Echo payload size in bytes. Default 32.
    pub payload_size: usize,

    addr: String,
    ip: IpAddr,
    family: AddrFamily,
    identifier: u16,
    stats: Statistics,
    sink: Box<dyn EventSink>,
    transport: Box<dyn ProbeTransport>,
    cancelled: Arc<AtomicBool>,
}

impl Prober {
    /// Resolve `address` and set up a prober over the raw ICMP transport.
    ///
    /// IPv6 targets are rejected here: the wire path is IPv4-only.
    pub fn new(address: &str) -> Result<Prober, ProbeError> {
        let (ip, family) = dns_resolver::resolve(address)?;
        let target = match ip {
            IpAddr::V4(target) => target,
            IpAddr::V6(_) => return Err(ProbeError::UnsupportedIpv6(ip)),
        };
        Ok(Self::assemble(address, ip, family, Box::new(RawTransport::new(target))))
    }

    /// Like [`Prober::new`], but probing through a caller-supplied transport.
    pub fn with_transport(
        address: &str,
        transport: Box<dyn ProbeTransport>,
    ) -> Result<Prober, ProbeError> {
        let (ip, family) = dns_resolver::resolve(address)?;
        Ok(Self::assemble(address, ip, family, transport))
    }

    fn assemble(
        address: &str,
        ip: IpAddr,
        family: AddrFamily,
        transport: Box<dyn ProbeTransport>,
    ) -> Prober {
        Prober {
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            count: DEFAULT_COUNT,
            payload_size: DEFAULT_PAYLOAD_SIZE,
            addr: address.to_string(),
            ip,
            family,
            // unique per instance so concurrent probers never correlate
            // each other's replies
            identifier: rand::random::<u16>(),
            stats: Statistics::default(),
            sink: Box::new(NopSink),
            transport,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replace the event sink. The default sink ignores all events.
    pub fn set_sink(&mut self, sink: impl EventSink + 'static) {
        self.sink = Box::new(sink);
    }

    /// Token for aborting the series from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        CancelToken {
            flag: Arc::clone(&self.cancelled),
        }
    }

    /// The target as given by the caller.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// The resolved target address.
    pub fn target_ip(&self) -> IpAddr {
        self.ip
    }

    pub fn family(&self) -> AddrFamily {
        self.family
    }

    pub fn packets_sent(&self) -> u64 {
        self.stats.packets_sent()
    }

    pub fn packets_recv(&self) -> u64 {
        self.stats.packets_recv()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Drive the probe series to completion.
    ///
    /// Blocks until `count` probes have been sent (or until cancelled when
    /// `count` is 0), then returns `Ok`. Per-probe timeouts are not errors;
    /// only a failure to open the channel or write a request aborts the run.
    pub fn run(&mut self) -> Result<(), ProbeError> {
        debug!("probing {} ({}) id={:#06x}", self.addr, self.ip, self.identifier);
        self.sink.on_start();

        let mut sequence: u16 = 1;
        loop {
            if self.cancelled.load(Ordering::Relaxed) || self.finished() {
                break;
            }

            self.probe_once(sequence)?;
            sequence = sequence.wrapping_add(1);

            if self.cancelled.load(Ordering::Relaxed) || self.finished() {
                break;
            }
            self.sleep_interval();
        }

        debug!(
            "finished {}: {} sent, {} received",
            self.addr,
            self.stats.packets_sent(),
            self.stats.packets_recv()
        );
        self.sink.on_finish(&self.stats);
        Ok(())
    }

    fn finished(&self) -> bool {
        self.count > 0 && self.stats.packets_sent() >= self.count
    }

    /// One full Sending → AwaitingReply → Classifying pass. The channel
    /// lives exactly as long as this call.
    fn probe_once(&mut self, sequence: u16) -> Result<(), ProbeError> {
        let request = packet::build_echo_request(self.identifier, sequence, self.payload_size);

        let mut channel = self.transport.open(request.len())?;
        let started = Instant::now();
        channel.send_request(&request)?;
        self.stats.record_sent();

        let received = channel.recv_reply(self.timeout);
        let elapsed = started.elapsed();
        drop(channel);

        match self.classify(received, elapsed, sequence) {
            Ok(ttl) => {
                self.stats.record_success(elapsed, ttl);
                self.sink.on_recv(&ProbeReport {
                    sequence,
                    rtt: elapsed,
                    ttl,
                });
            }
            Err(failure) => {
                debug!("seq {} lost: {}", sequence, failure);
                self.stats.record_timeout(elapsed);
                self.sink.on_timeout(&failure);
            }
        }
        Ok(())
    }

    fn classify(
        &self,
        received: std::io::Result<Option<Vec<u8>>>,
        elapsed: Duration,
        sequence: u16,
    ) -> Result<u8, ProbeFailure> {
        let datagram = match received {
            Ok(Some(datagram)) => datagram,
            Ok(None) => return Err(ProbeFailure::DeadlineExpired),
            Err(e) => {
                warn!("read from {} failed: {}", self.addr, e);
                return Err(ProbeFailure::ReadError);
            }
        };

        let reply = packet::decode_echo_reply(&datagram).ok_or(ProbeFailure::ReplyMismatch)?;

        if reply.icmp_type == IcmpTypes::TimeExceeded {
            return Err(ProbeFailure::TimeExceeded);
        }
        if reply.identifier != self.identifier || reply.sequence != sequence {
            return Err(ProbeFailure::ReplyMismatch);
        }
        if elapsed >= self.timeout {
            return Err(ProbeFailure::DeadlineExpired);
        }
        Ok(reply.ttl)
    }

    // interval wait, sliced so a cancel does not have to sit out the rest
    // of the interval
    fn sleep_interval(&self) {
        let deadline = Instant::now() + self.interval;
        while !self.cancelled.load(Ordering::Relaxed) {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            thread::sleep(remaining.min(CANCEL_POLL));
        }
    }
}
