//! Network address formatting.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Format an IPv4 address in dotted-decimal notation.
///
/// # Example
///
/// ```
/// use std::net::Ipv4Addr;
/// use pcapstreams_core::format::format_ipv4;
///
/// assert_eq!(format_ipv4(&Ipv4Addr::new(192, 168, 1, 1)), "192.168.1.1");
/// ```
pub fn format_ipv4(addr: &Ipv4Addr) -> String {
    addr.to_string()
}

/// Format an IPv6 address.
///
/// IPv4-mapped addresses (`::ffff:a.b.c.d`) render as plain dotted-decimal,
/// everything else in RFC 5952 form.
///
/// # Example
///
/// ```
/// use pcapstreams_core::format::format_ipv6;
///
/// assert_eq!(format_ipv6(&"2001:db8::1".parse().unwrap()), "2001:db8::1");
/// assert_eq!(format_ipv6(&"::ffff:10.0.0.1".parse().unwrap()), "10.0.0.1");
/// ```
pub fn format_ipv6(addr: &Ipv6Addr) -> String {
    match addr.to_ipv4_mapped() {
        Some(v4) => v4.to_string(),
        None => addr.to_string(),
    }
}

/// Format either address family.
pub fn format_ip(addr: &IpAddr) -> String {
    match addr {
        IpAddr::V4(v4) => format_ipv4(v4),
        IpAddr::V6(v6) => format_ipv6(v6),
    }
}

/// Format 6 bytes as a MAC address string in colon-separated hex format.
pub fn format_mac(bytes: &[u8; 6]) -> String {
    format!(
        "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]
    )
}
