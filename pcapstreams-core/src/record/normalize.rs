//! Frame to record normalization.

use crate::format::{format_ipv4, format_ipv6, format_timestamp};
use crate::pcap::RawPacket;
use crate::protocol::{default_registry, ip_protocol_name, parse_packet, DecodedFrame, ProtocolRegistry};

use super::{Classification, PacketRecord};

/// Build the record for one decoded frame.
///
/// Never fails: layers missing from `frame` leave their fields empty or zero.
pub fn normalize(index: u64, packet: &RawPacket, frame: &DecodedFrame<'_>) -> PacketRecord {
    let mut src_ip = String::new();
    let mut dst_ip = String::new();
    let mut protocol = String::new();
    let mut src_port = 0;
    let mut dst_port = 0;
    let mut payload_hex = None;
    let mut payload_ascii = None;

    if let Some(ip) = frame.ipv4() {
        src_ip = format_ipv4(&ip.src);
        dst_ip = format_ipv4(&ip.dst);
        protocol = ip_protocol_name(ip.protocol).to_string();
    } else if let Some(ip) = frame.ipv6() {
        src_ip = format_ipv6(&ip.src);
        dst_ip = format_ipv6(&ip.dst);
        protocol = ip_protocol_name(ip.next_header).to_string();
    }

    if let Some(tcp) = frame.tcp() {
        protocol = "TCP".to_string();
        src_port = tcp.src_port;
        dst_port = tcp.dst_port;
        if !tcp.payload.is_empty() {
            payload_hex = Some(hex::encode(tcp.payload));
            payload_ascii = Some(String::from_utf8_lossy(tcp.payload).into_owned());
        }
    } else if let Some(udp) = frame.udp() {
        protocol = "UDP".to_string();
        src_port = udp.src_port;
        dst_port = udp.dst_port;
    }

    PacketRecord {
        index,
        timestamp: format_timestamp(packet.timestamp_ns),
        src_ip,
        src_port,
        dst_ip,
        dst_port,
        protocol,
        length: packet.data.len(),
        payload_hex,
        payload_ascii,
        classification: Classification::of(frame),
    }
}

/// Decodes raw frames and normalizes them into records.
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    registry: ProtocolRegistry,
}

impl RecordNormalizer {
    pub fn new(registry: ProtocolRegistry) -> Self {
        Self { registry }
    }

    /// Decode `packet` and build its record under `index`.
    pub fn normalize(&self, index: u64, packet: &RawPacket) -> PacketRecord {
        let frame = parse_packet(&self.registry, packet.link_type, &packet.data);
        normalize(index, packet, &frame)
    }
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(default_registry())
    }
}
