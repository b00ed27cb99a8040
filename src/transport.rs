//! Raw ICMP transport, one scoped channel per probe.

use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use log::debug;
use pnet::packet::Packet;
use pnet::packet::icmp::IcmpPacket;
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::transport::TransportChannelType::Layer4;
use pnet::transport::TransportProtocol::Ipv4;
use pnet::transport::{TransportReceiver, TransportSender, ipv4_packet_iter, transport_channel};

use crate::error::ProbeError;
use crate::packet::IPV4_HEADER_LEN;

/// Opens one channel per probe. Open failure is fatal to the run.
pub trait ProbeTransport: Send {
    /// `request_len` is the encoded request size; implementations size their
    /// receive buffer to hold the reply header plus the echoed request.
    fn open(&mut self, request_len: usize) -> Result<Box<dyn ProbeChannel>, ProbeError>;
}

/// A channel scoped to a single probe; dropped (and thereby closed) at the
/// end of the iteration on every exit path.
pub trait ProbeChannel {
    /// Write the encoded request. Failure is fatal to the run.
    fn send_request(&mut self, request: &[u8]) -> Result<(), ProbeError>;

    /// Wait up to `timeout` for an IPv4 datagram from the target.
    ///
    /// `Ok(None)` means the deadline expired; `Err` means the read failed.
    /// Neither is fatal; both classify as a timeout for this probe only.
    fn recv_reply(&mut self, timeout: Duration) -> io::Result<Option<Vec<u8>>>;
}

/// Production transport over a `pnet` Layer-4 ICMP channel.
pub struct RawTransport {
    target: Ipv4Addr,
}

impl RawTransport {
    pub fn new(target: Ipv4Addr) -> Self {
        RawTransport { target }
    }
}

impl ProbeTransport for RawTransport {
    fn open(&mut self, request_len: usize) -> Result<Box<dyn ProbeChannel>, ProbeError> {
        let buffer_size = IPV4_HEADER_LEN + request_len;
        let (tx, rx) = transport_channel(buffer_size, Layer4(Ipv4(IpNextHeaderProtocols::Icmp)))?;
        Ok(Box::new(RawChannel {
            target: self.target,
            tx,
            rx,
        }))
    }
}

struct RawChannel {
    target: Ipv4Addr,
    tx: TransportSender,
    rx: TransportReceiver,
}

impl ProbeChannel for RawChannel {
    fn send_request(&mut self, request: &[u8]) -> Result<(), ProbeError> {
        let packet = IcmpPacket::new(request).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "request shorter than an ICMP header")
        })?;
        self.tx.send_to(packet, IpAddr::V4(self.target))?;
        Ok(())
    }

    fn recv_reply(&mut self, timeout: Duration) -> io::Result<Option<Vec<u8>>> {
        let deadline = Instant::now() + timeout;
        let mut iter = ipv4_packet_iter(&mut self.rx);
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            match iter.next_with_timeout(remaining)? {
                Some((datagram, source)) => {
                    // the channel is unconnected, so datagrams from other
                    // hosts show up here as well
                    if source == IpAddr::V4(self.target) {
                        return Ok(Some(datagram.packet().to_vec()));
                    }
                    debug!("ignoring datagram from {}", source);
                }
                None => return Ok(None),
            }
        }
    }
}
