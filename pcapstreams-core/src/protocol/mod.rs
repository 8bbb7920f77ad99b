//! Protocol decoding framework.
//!
//! This module provides:
//! - [`Protocol`] trait for implementing layer decoders
//! - [`ProtocolRegistry`] for priority-based decoder selection
//! - [`DecodedFrame`], the ordered list of [`Layer`]s a frame decodes into
//!
//! ## Supported Protocols
//!
//! | Layer | Protocols |
//! |-------|-----------|
//! | Link | Ethernet, Linux SLL, VLAN (802.1Q / QinQ), raw IP |
//! | Network | IPv4, IPv6 (with extension headers) |
//! | Transport | TCP, UDP, ICMP, ICMPv6 |
//! | Application | DNS |
//!
//! ## Example
//!
//! ```rust
//! use pcapstreams_core::protocol::{default_registry, parse_packet};
//!
//! let registry = default_registry();
//! let frame_bytes: &[u8] = &[
//!     0xff, 0xff, 0xff, 0xff, 0xff, 0xff,  // dst mac
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00,  // src mac
//!     0x08, 0x06,                          // ethertype (ARP)
//! ];
//!
//! let frame = parse_packet(&registry, 1, frame_bytes); // 1 = Ethernet
//! assert_eq!(frame.layers().len(), 1);
//! assert!(frame.ipv4().is_none());
//! ```

mod context;
mod ip_protocol;
mod layer;
mod registry;

// Protocol implementations
mod dns;
mod ethernet;
mod fragment;
mod icmp;
mod icmpv6;
mod ipv4;
mod ipv6;
mod linux_sll;
mod tcp;
mod udp;
mod vlan;

// Packet builders and a capture writer for tests
#[doc(hidden)]
pub mod test_utils;

pub use context::{HintEntry, ParseContext, ParseResult};
pub use ip_protocol::{ip_proto, ip_protocol_name, UNKNOWN_IP_PROTOCOL};
pub use layer::{
    tcp_flags, DecodedFrame, DnsLayer, EthernetLayer, IcmpLayer, Ipv4Layer, Ipv6Layer, Layer,
    LinuxSllLayer, TcpLayer, UdpLayer, VlanLayer,
};
pub use registry::{BuiltinProtocol, PayloadMode, Protocol, ProtocolRegistry};

pub use dns::{DnsProtocol, DNS_PORT};
pub use ethernet::{ethertype, EthernetProtocol};
pub use fragment::FragmentProtocol;
pub use icmp::{icmp_type, IcmpProtocol};
pub use icmpv6::Icmpv6Protocol;
pub use ipv4::Ipv4Protocol;
pub use ipv6::Ipv6Protocol;
pub use linux_sll::LinuxSllProtocol;
pub use tcp::TcpProtocol;
pub use udp::UdpProtocol;
pub use vlan::VlanProtocol;

/// PCAP link-layer header types.
pub mod link_type {
    pub const LINKTYPE_ETHERNET: u16 = 1;
    pub const LINKTYPE_RAW: u16 = 101;
    pub const LINKTYPE_LINUX_SLL: u16 = 113;
    pub const LINKTYPE_IPV4: u16 = 228;
    pub const LINKTYPE_IPV6: u16 = 229;
}

/// Create a registry with all built-in protocol decoders.
pub fn default_registry() -> ProtocolRegistry {
    let mut registry = ProtocolRegistry::new();

    // Layer 2
    registry.register(EthernetProtocol);
    registry.register(LinuxSllProtocol);
    registry.register(VlanProtocol);

    // Layer 3
    registry.register(Ipv4Protocol);
    registry.register(Ipv6Protocol);

    // Layer 4
    registry.register(TcpProtocol);
    registry.register(UdpProtocol);
    registry.register(IcmpProtocol);
    registry.register(Icmpv6Protocol);

    // Fragmented datagram bodies
    registry.register(FragmentProtocol);

    // Application layer
    registry.register(DnsProtocol);

    registry
}

/// Build the root context for a frame.
///
/// Raw IP link types have no link header, so the network protocol is
/// seeded directly from the link type or the IP version nibble.
fn root_context(link_type: u16, data: &[u8]) -> ParseContext {
    let mut context = ParseContext::new(link_type);

    let raw_ethertype = match link_type {
        link_type::LINKTYPE_IPV4 => Some(ethertype::IPV4),
        link_type::LINKTYPE_IPV6 => Some(ethertype::IPV6),
        link_type::LINKTYPE_RAW => match data.first().map(|b| b >> 4) {
            Some(4) => Some(ethertype::IPV4),
            Some(6) => Some(ethertype::IPV6),
            _ => None,
        },
        _ => None,
    };
    if let Some(et) = raw_ethertype {
        context.set_hint("ethertype", et as u64);
    }

    context
}

/// Decode a frame through all protocol layers.
///
/// Decoding never fails: a layer whose bytes do not match is left out and
/// decoding stops there, keeping every layer decoded so far.
pub fn parse_packet<'a>(
    registry: &ProtocolRegistry,
    link_type: u16,
    data: &'a [u8],
) -> DecodedFrame<'a> {
    let mut frame = DecodedFrame::new();
    let mut context = root_context(link_type, data);
    let mut remaining = data;

    while !remaining.is_empty() {
        let parser = match registry.find_parser(&context) {
            Some(p) => p,
            None => break,
        };

        let result = parser.parse(remaining, &context);
        if let Some(layer) = result.layer {
            frame.push(layer);
        }
        if result.error.is_some() {
            break;
        }

        // Update context for next layer
        context.parent_protocol = Some(parser.name());
        context.hints = result.child_hints;
        context.offset += remaining.len() - result.remaining.len();
        remaining = result.remaining;

        match parser.payload_mode() {
            PayloadMode::None => break,
            PayloadMode::Chain => {}
            PayloadMode::Payload => {
                if !remaining.is_empty() && registry.find_parser(&context).is_none() {
                    frame.push(Layer::Payload(remaining));
                    break;
                }
            }
        }
    }

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::test_utils::{
        DnsBuilder, EthernetBuilder, IcmpBuilder, Ipv4Builder, Ipv6Builder, TcpBuilder,
        UdpBuilder,
    };
    use std::net::Ipv4Addr;

    #[test]
    fn test_parse_tcp_frame() {
        let tcp = TcpBuilder::new()
            .src_port(1111)
            .dst_port(80)
            .psh_ack()
            .payload(b"GET /".to_vec())
            .build();
        let ip = Ipv4Builder::new()
            .src_ip([10, 0, 0, 1])
            .dst_ip([10, 0, 0, 2])
            .tcp()
            .payload(tcp)
            .build();
        let frame_bytes = EthernetBuilder::new().ipv4().payload(ip).build();

        let frame = parse_packet(&default_registry(), 1, &frame_bytes);

        assert_eq!(frame.ipv4().map(|ip| ip.src), Some(Ipv4Addr::new(10, 0, 0, 1)));
        let tcp = frame.tcp().unwrap();
        assert_eq!((tcp.src_port, tcp.dst_port), (1111, 80));
        assert_eq!(tcp.payload, b"GET /");
        // Unclaimed TCP payload surfaces as an application payload layer
        assert!(matches!(frame.layers().last(), Some(Layer::Payload(p)) if *p == b"GET /"));
        assert!(frame.dns().is_none());
    }

    #[test]
    fn test_parse_empty_tcp_has_no_payload_layer() {
        let tcp = TcpBuilder::new().syn().build();
        let ip = Ipv4Builder::new().tcp().payload(tcp).build();
        let frame_bytes = EthernetBuilder::new().ipv4().payload(ip).build();

        let frame = parse_packet(&default_registry(), 1, &frame_bytes);
        assert!(frame.tcp().is_some());
        assert!(!frame.has_application());
    }

    #[test]
    fn test_parse_udp_dns_frame() {
        let dns = DnsBuilder::query(0x0101, "example.org").build();
        let udp = UdpBuilder::new().src_port(40000).dns().payload(dns).build();
        let ip = Ipv4Builder::new().udp().payload(udp).build();
        let frame_bytes = EthernetBuilder::new().ipv4().payload(ip).build();

        let frame = parse_packet(&default_registry(), 1, &frame_bytes);
        assert!(frame.udp().is_some());
        assert_eq!(frame.dns().map(|d| d.transaction_id), Some(0x0101));
        // DNS is terminal, nothing after it
        assert!(matches!(frame.layers().last(), Some(Layer::Dns(_))));
    }

    #[test]
    fn test_parse_vlan_tagged_frame() {
        let udp = UdpBuilder::new().dst_port(9000).payload(vec![1, 2, 3]).build();
        let ip = Ipv4Builder::new().udp().payload(udp).build();
        let mut tagged = vec![0x00, 0x0a, 0x08, 0x00]; // VID 10, inner IPv4
        tagged.extend_from_slice(&ip);
        let frame_bytes = EthernetBuilder::new()
            .ethertype(ethertype::VLAN)
            .payload(tagged)
            .build();

        let frame = parse_packet(&default_registry(), 1, &frame_bytes);
        assert!(matches!(frame.layers()[1], Layer::Vlan(VlanLayer { vlan_id: 10, .. })));
        assert_eq!(frame.udp().map(|u| u.dst_port), Some(9000));
    }

    #[test]
    fn test_parse_raw_ip_link_types() {
        let icmp = IcmpBuilder::new().echo_request().build();
        let ip = Ipv4Builder::new().icmp().payload(icmp).build();

        for lt in [link_type::LINKTYPE_RAW, link_type::LINKTYPE_IPV4] {
            let frame = parse_packet(&default_registry(), lt, &ip);
            assert!(frame.ipv4().is_some(), "link type {lt}");
            assert!(frame.icmpv4().is_some(), "link type {lt}");
        }

        let ip6 = Ipv6Builder::new()
            .next_header(ip_proto::ICMPV6)
            .payload(vec![0x80, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01])
            .build();
        let frame = parse_packet(&default_registry(), link_type::LINKTYPE_RAW, &ip6);
        assert!(frame.ipv6().is_some());
        assert!(frame.icmpv6().is_some());
    }

    #[test]
    fn test_unknown_link_type_decodes_nothing() {
        let frame = parse_packet(&default_registry(), 147, &[0x45, 0x00, 0x00, 0x14]);
        assert!(frame.is_empty());
    }

    #[test]
    fn test_truncated_transport_keeps_network_layer() {
        // IPv4 header claims TCP but only 4 bytes of TCP follow
        let ip = Ipv4Builder::new().tcp().payload(vec![0x04, 0x57, 0x00, 0x50]).build();
        let frame_bytes = EthernetBuilder::new().ipv4().payload(ip).build();

        let frame = parse_packet(&default_registry(), 1, &frame_bytes);
        assert!(frame.ipv4().is_some());
        assert!(frame.tcp().is_none());
    }

    #[test]
    fn test_first_ipv4_fragment_is_not_decoded_as_udp() {
        let udp = UdpBuilder::new()
            .src_port(5000)
            .dst_port(6000)
            .payload(vec![0x5a; 24])
            .build();
        let mut ip = Ipv4Builder::new().udp().payload(udp).build();
        ip[6] = 0x20; // MF

        let frame = parse_packet(&default_registry(), link_type::LINKTYPE_RAW, &ip);
        assert!(frame.ipv4().is_some());
        assert!(frame.udp().is_none());
        assert!(frame.has_application());
        assert!(matches!(frame.layers().last(), Some(Layer::Payload(p)) if p.len() == 32));
    }

    #[test]
    fn test_ipv6_fragment_header_body_is_payload() {
        let mut body = vec![ip_proto::TCP, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x09];
        body.extend_from_slice(&[0x77; 12]);
        let ip6 = Ipv6Builder::new()
            .next_header(ip_proto::FRAGMENT)
            .payload(body)
            .build();

        let frame = parse_packet(&default_registry(), link_type::LINKTYPE_IPV6, &ip6);
        assert!(frame.tcp().is_none());
        assert!(matches!(frame.layers().last(), Some(Layer::Payload(p)) if p.len() == 12));
    }
}
