//! Text rendering for packet records.
//!
//! - IP addresses, with IPv4-mapped IPv6 addresses shown in dotted-decimal form
//! - MAC addresses as colon-separated hex
//! - Capture timestamps as `YYYY-MM-DD HH:MM:SS[.fraction] +0000 UTC`

mod address;
mod time;

pub use address::{format_ip, format_ipv4, format_ipv6, format_mac};
pub use time::format_timestamp;
