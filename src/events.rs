use std::fmt;
use std::time::Duration;

use crate::stats::Statistics;

/// A successful probe, handed to [`EventSink::on_recv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    pub sequence: u16,
    pub rtt: Duration,
    pub ttl: u8,
}

/// Why a probe did not count as a success. All kinds are reported through
/// the same [`EventSink::on_timeout`] callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailure {
    /// No datagram arrived before the per-probe deadline.
    DeadlineExpired,
    /// The socket read failed.
    ReadError,
    /// A datagram arrived but its identifier/sequence did not match the
    /// request, or it could not be parsed at all.
    ReplyMismatch,
    /// An ICMP Time Exceeded (type 11) arrived instead of an echo reply.
    TimeExceeded,
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProbeFailure::DeadlineExpired => "deadline expired",
            ProbeFailure::ReadError => "socket read failed",
            ProbeFailure::ReplyMismatch => "reply did not match the request",
            ProbeFailure::TimeExceeded => "time to live exceeded in transit",
        })
    }
}

/// Listener for probe lifecycle events. Every method defaults to a no-op,
/// so callers override only what they care about.
pub trait EventSink: Send {
    /// Invoked once, before the first send.
    fn on_start(&mut self) {}

    /// Invoked for every probe classified as a success.
    fn on_recv(&mut self, _reply: &ProbeReport) {}

    /// Invoked for every probe classified as lost.
    fn on_timeout(&mut self, _failure: &ProbeFailure) {}

    /// Invoked once, when the run terminates without a fatal error.
    fn on_finish(&mut self, _stats: &Statistics) {}
}

/// The default sink: ignores everything.
pub struct NopSink;

impl EventSink for NopSink {}
