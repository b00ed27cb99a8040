use std::io;
use std::net::IpAddr;
use thiserror::Error;

/// Fatal failures of a probe run.
///
/// Per-probe timeouts are not errors; they are reported through
/// [`EventSink::on_timeout`](crate::events::EventSink::on_timeout) and the
/// loop keeps going.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The target address could not be resolved to an IP. Raised at
    /// construction, before any probe is sent.
    #[error("failed to resolve {addr}: {source}")]
    Resolve {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// The target resolved to an IPv6 address. The echo path speaks
    /// RFC 792 ICMPv4 only.
    #[error("{0} is an IPv6 address, which the IPv4 echo path does not support")]
    UnsupportedIpv6(IpAddr),

    /// The raw channel could not be opened or the request could not be
    /// written. Aborts the run.
    #[error("transport failure: {0}")]
    Transport(#[from] io::Error),
}
