use std::time::Duration;

/// Running counters and round-trip-time aggregates for one probe series.
///
/// Extrema and the RTT sum only ever move on classified successes, so a run
/// of timeouts cannot skew the reported latency.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    sent: u64,
    received: u64,
    sum: Duration,
    shortest: Option<Duration>,
    longest: Option<Duration>,
    last_ttl: Option<u8>,
    last_elapsed: Option<Duration>,
}

impl Statistics {
    pub(crate) fn record_sent(&mut self) {
        self.sent += 1;
    }

    pub(crate) fn record_success(&mut self, rtt: Duration, ttl: u8) {
        self.received += 1;
        self.sum += rtt;
        self.shortest = Some(self.shortest.map_or(rtt, |s| s.min(rtt)));
        self.longest = Some(self.longest.map_or(rtt, |l| l.max(rtt)));
        self.last_ttl = Some(ttl);
        self.last_elapsed = Some(rtt);
    }

    pub(crate) fn record_timeout(&mut self, elapsed: Duration) {
        self.last_elapsed = Some(elapsed);
    }

    pub fn packets_sent(&self) -> u64 {
        self.sent
    }

    pub fn packets_recv(&self) -> u64 {
        self.received
    }

    /// Shortest successful RTT, `None` until the first reply.
    pub fn shortest_rtt(&self) -> Option<Duration> {
        self.shortest
    }

    /// Longest successful RTT, `None` until the first reply.
    pub fn longest_rtt(&self) -> Option<Duration> {
        self.longest
    }

    /// TTL of the most recent successful reply.
    pub fn last_ttl(&self) -> Option<u8> {
        self.last_ttl
    }

    /// Elapsed time of the most recent probe, success or not.
    pub fn last_elapsed(&self) -> Option<Duration> {
        self.last_elapsed
    }

    /// Packet loss in percent; 0 when nothing has been sent yet.
    pub fn loss_percent(&self) -> f64 {
        if self.sent == 0 {
            return 0.0;
        }
        (self.sent - self.received) as f64 * 100.0 / self.sent as f64
    }

    /// Mean RTT over successful probes, `None` until the first reply.
    pub fn average_rtt(&self) -> Option<Duration> {
        if self.received == 0 {
            return None;
        }
        Some(self.sum / self.received as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn average_is_the_mean_of_successes() {
        let mut stats = Statistics::default();
        for rtt in [10, 20, 60] {
            stats.record_sent();
            stats.record_success(ms(rtt), 64);
        }
        assert_eq!(stats.average_rtt(), Some(ms(30)));
        assert_eq!(stats.shortest_rtt(), Some(ms(10)));
        assert_eq!(stats.longest_rtt(), Some(ms(60)));
        assert!(stats.shortest_rtt() <= stats.average_rtt());
        assert!(stats.average_rtt() <= stats.longest_rtt());
    }

    #[test]
    fn timeouts_leave_extrema_alone() {
        let mut stats = Statistics::default();
        stats.record_sent();
        stats.record_success(ms(5), 57);
        stats.record_sent();
        stats.record_timeout(ms(1000));

        assert_eq!(stats.shortest_rtt(), Some(ms(5)));
        assert_eq!(stats.longest_rtt(), Some(ms(5)));
        assert_eq!(stats.average_rtt(), Some(ms(5)));
        assert_eq!(stats.last_elapsed(), Some(ms(1000)));
        assert_eq!(stats.last_ttl(), Some(57));
    }

    #[test]
    fn loss_percent_counts_unanswered_probes() {
        let mut stats = Statistics::default();
        assert_eq!(stats.loss_percent(), 0.0);

        for hit in [true, false, true, false] {
            stats.record_sent();
            if hit {
                stats.record_success(ms(1), 64);
            } else {
                stats.record_timeout(ms(100));
            }
        }
        assert_eq!(stats.loss_percent(), 50.0);
        assert!(stats.packets_recv() <= stats.packets_sent());
    }

    #[test]
    fn no_average_before_the_first_reply() {
        let mut stats = Statistics::default();
        stats.record_sent();
        stats.record_timeout(ms(100));
        assert_eq!(stats.average_rtt(), None);
        assert_eq!(stats.loss_percent(), 100.0);
    }
}
