//! Echo request/reply wire codec (RFC 792 IPv4 ICMP).

use pnet::packet::Packet;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{IcmpCode, IcmpPacket, IcmpType, IcmpTypes, checksum};
use pnet::packet::ipv4::Ipv4Packet;

/// ICMP echo header length (fixed).
pub const ICMP_HEADER_LEN: usize = 8;
/// IPv4 header length assumed on received datagrams (no IP options).
pub const IPV4_HEADER_LEN: usize = 20;
/// Default echo payload size.
pub const DEFAULT_PAYLOAD_SIZE: usize = 32;

/// Fields of a received echo reply, pulled out of the raw IPv4 datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoReply {
    pub icmp_type: IcmpType,
    pub identifier: u16,
    pub sequence: u16,
    pub ttl: u8,
}

/// Build an echo request: type 8, code 0, the given identifier and sequence,
/// a zero-filled payload of `payload_size` bytes, and the Internet checksum
/// written back over the whole message.
pub fn build_echo_request(identifier: u16, sequence: u16, payload_size: usize) -> Vec<u8> {
    let mut buffer = vec![0u8; ICMP_HEADER_LEN + payload_size];

    let mut echo_packet = MutableEchoRequestPacket::new(&mut buffer).unwrap();
    echo_packet.set_icmp_type(IcmpTypes::EchoRequest);
    echo_packet.set_icmp_code(IcmpCode::new(0));
    echo_packet.set_identifier(identifier);
    echo_packet.set_sequence_number(sequence);

    let echo_checksum = checksum(&IcmpPacket::new(echo_packet.packet()).unwrap());
    echo_packet.set_checksum(echo_checksum);

    buffer
}

/// Parse an echo reply out of a received IPv4 datagram.
///
/// The datagram is assumed to start with a 20-byte IPv4 header (no options)
/// followed by the ICMP message. Returns `None` when the buffer is too short
/// to hold both headers.
pub fn decode_echo_reply(datagram: &[u8]) -> Option<EchoReply> {
    if datagram.len() < IPV4_HEADER_LEN + ICMP_HEADER_LEN {
        return None;
    }

    let ipv4 = Ipv4Packet::new(datagram)?;
    let icmp = EchoReplyPacket::new(&datagram[IPV4_HEADER_LEN..])?;

    Some(EchoReply {
        icmp_type: icmp.get_icmp_type(),
        identifier: icmp.get_identifier(),
        sequence: icmp.get_sequence_number(),
        ttl: ipv4.get_ttl(),
    })
}
