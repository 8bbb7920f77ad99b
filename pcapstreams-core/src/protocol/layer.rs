//! Decoded protocol layers.
//!
//! A frame decodes into an ordered list of [`Layer`]s, outermost first.
//! [`DecodedFrame`] exposes a fixed set of accessors (`ipv4()`, `tcp()`, ...)
//! over that list so the record normalizer never needs to know how a layer
//! was produced.

use std::net::{Ipv4Addr, Ipv6Addr};

use smallvec::SmallVec;

/// Ethernet II header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetLayer {
    pub src_mac: [u8; 6],
    pub dst_mac: [u8; 6],
    pub ethertype: u16,
}

/// Linux cooked capture (SLL) header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinuxSllLayer {
    pub packet_type: u16,
    pub protocol: u16,
}

/// 802.1Q / 802.1ad tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlanLayer {
    pub vlan_id: u16,
    pub priority: u8,
    pub ethertype: u16,
}

/// IPv4 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Layer {
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
    pub protocol: u8,
    pub ttl: u8,
}

/// IPv6 fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6Layer {
    pub src: Ipv6Addr,
    pub dst: Ipv6Addr,
    /// Next header from the fixed header, before any extension headers.
    pub next_header: u8,
    /// Protocol found after walking the extension header chain.
    pub upper_protocol: u8,
    pub hop_limit: u8,
}

/// TCP segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TcpLayer<'data> {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub flags: u8,
    pub payload: &'data [u8],
}

/// TCP flag bits.
pub mod tcp_flags {
    pub const FIN: u8 = 0x01;
    pub const SYN: u8 = 0x02;
    pub const RST: u8 = 0x04;
    pub const PSH: u8 = 0x08;
    pub const ACK: u8 = 0x10;
    pub const URG: u8 = 0x20;
}

/// UDP datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpLayer<'data> {
    pub src_port: u16,
    pub dst_port: u16,
    pub payload: &'data [u8],
}

/// ICMP or ICMPv6 message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpLayer {
    pub icmp_type: u8,
    pub code: u8,
}

/// DNS message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DnsLayer {
    pub transaction_id: u16,
    pub is_response: bool,
    pub opcode: u8,
    pub rcode: u8,
    pub question_count: u16,
    pub answer_count: u16,
}

/// One decoded protocol layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer<'data> {
    Ethernet(EthernetLayer),
    LinuxSll(LinuxSllLayer),
    Vlan(VlanLayer),
    Ipv4(Ipv4Layer),
    Ipv6(Ipv6Layer),
    Tcp(TcpLayer<'data>),
    Udp(UdpLayer<'data>),
    Icmpv4(IcmpLayer),
    Icmpv6(IcmpLayer),
    Dns(DnsLayer),
    /// Bytes left over after a transport or ICMP layer that no decoder claimed.
    Payload(&'data [u8]),
}

/// All layers decoded from one frame, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedFrame<'data> {
    layers: SmallVec<[Layer<'data>; 8]>,
}

impl<'data> DecodedFrame<'data> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Layer<'data>) {
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[Layer<'data>] {
        &self.layers
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn ipv4(&self) -> Option<&Ipv4Layer> {
        self.layers.iter().find_map(|l| match l {
            Layer::Ipv4(ip) => Some(ip),
            _ => None,
        })
    }

    pub fn ipv6(&self) -> Option<&Ipv6Layer> {
        self.layers.iter().find_map(|l| match l {
            Layer::Ipv6(ip) => Some(ip),
            _ => None,
        })
    }

    pub fn tcp(&self) -> Option<&TcpLayer<'data>> {
        self.layers.iter().find_map(|l| match l {
            Layer::Tcp(tcp) => Some(tcp),
            _ => None,
        })
    }

    pub fn udp(&self) -> Option<&UdpLayer<'data>> {
        self.layers.iter().find_map(|l| match l {
            Layer::Udp(udp) => Some(udp),
            _ => None,
        })
    }

    pub fn icmpv4(&self) -> Option<&IcmpLayer> {
        self.layers.iter().find_map(|l| match l {
            Layer::Icmpv4(icmp) => Some(icmp),
            _ => None,
        })
    }

    pub fn icmpv6(&self) -> Option<&IcmpLayer> {
        self.layers.iter().find_map(|l| match l {
            Layer::Icmpv6(icmp) => Some(icmp),
            _ => None,
        })
    }

    pub fn dns(&self) -> Option<&DnsLayer> {
        self.layers.iter().find_map(|l| match l {
            Layer::Dns(dns) => Some(dns),
            _ => None,
        })
    }

    /// Application-layer content: a decoded DNS message or an unclaimed payload.
    pub fn has_application(&self) -> bool {
        self.layers
            .iter()
            .any(|l| matches!(l, Layer::Dns(_) | Layer::Payload(_)))
    }
}

impl<'data> FromIterator<Layer<'data>> for DecodedFrame<'data> {
    fn from_iter<I: IntoIterator<Item = Layer<'data>>>(iter: I) -> Self {
        Self {
            layers: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_find_first_match() {
        let frame: DecodedFrame = [
            Layer::Ipv4(Ipv4Layer {
                src: Ipv4Addr::new(10, 0, 0, 1),
                dst: Ipv4Addr::new(10, 0, 0, 2),
                protocol: 17,
                ttl: 64,
            }),
            Layer::Udp(UdpLayer {
                src_port: 5353,
                dst_port: 53,
                payload: &[],
            }),
        ]
        .into_iter()
        .collect();

        assert_eq!(frame.ipv4().map(|ip| ip.protocol), Some(17));
        assert!(frame.ipv6().is_none());
        assert!(frame.tcp().is_none());
        assert_eq!(frame.udp().map(|u| u.dst_port), Some(53));
        assert!(!frame.has_application());
    }

    #[test]
    fn test_payload_counts_as_application() {
        let frame: DecodedFrame = [Layer::Payload(b"hello")].into_iter().collect();
        assert!(frame.has_application());
        assert_eq!(frame.layers().len(), 1);
    }
}
