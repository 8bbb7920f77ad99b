//! IP protocol numbers and their display names.

/// IANA-assigned IP protocol numbers used by the decoders.
#[allow(dead_code)]
pub mod ip_proto {
    pub const HOP_BY_HOP: u8 = 0;
    pub const ICMP: u8 = 1;
    pub const IGMP: u8 = 2;
    pub const IPIP: u8 = 4;
    pub const TCP: u8 = 6;
    pub const UDP: u8 = 17;
    pub const IPV6: u8 = 41;
    pub const ROUTING: u8 = 43;
    pub const FRAGMENT: u8 = 44;
    pub const GRE: u8 = 47;
    pub const ESP: u8 = 50;
    pub const AH: u8 = 51;
    pub const ICMPV6: u8 = 58;
    pub const NO_NEXT_HEADER: u8 = 59;
    pub const DESTINATION: u8 = 60;
    pub const OSPF: u8 = 89;
    pub const ETHERIP: u8 = 97;
    pub const VRRP: u8 = 112;
    pub const SCTP: u8 = 132;
    pub const MOBILITY: u8 = 135;
    pub const UDP_LITE: u8 = 136;
    pub const MPLS_IN_IP: u8 = 137;
}

/// Name used for protocol numbers without an entry.
pub const UNKNOWN_IP_PROTOCOL: &str = "UnknownIPProtocol";

/// Display name of an IP protocol / IPv6 next-header value.
///
/// Names follow the short forms common in capture tooling ("ICMPv4",
/// "IPv6HopByHop", "IPSecESP").
pub fn ip_protocol_name(protocol: u8) -> &'static str {
    match protocol {
        ip_proto::HOP_BY_HOP => "IPv6HopByHop",
        ip_proto::ICMP => "ICMPv4",
        ip_proto::IGMP => "IGMP",
        ip_proto::IPIP => "IPv4",
        ip_proto::TCP => "TCP",
        ip_proto::UDP => "UDP",
        ip_proto::IPV6 => "IPv6",
        ip_proto::ROUTING => "IPv6Routing",
        ip_proto::FRAGMENT => "IPv6Fragment",
        ip_proto::GRE => "GRE",
        ip_proto::ESP => "IPSecESP",
        ip_proto::AH => "IPSecAH",
        ip_proto::ICMPV6 => "ICMPv6",
        ip_proto::NO_NEXT_HEADER => "IPv6NoNextHeader",
        ip_proto::DESTINATION => "IPv6Destination",
        ip_proto::OSPF => "OSPF",
        94 => "IPIP",
        ip_proto::ETHERIP => "EtherIP",
        ip_proto::VRRP => "VRRP",
        ip_proto::SCTP => "SCTP",
        ip_proto::UDP_LITE => "UDPLite",
        ip_proto::MPLS_IN_IP => "MPLSInIP",
        _ => UNKNOWN_IP_PROTOCOL,
    }
}
