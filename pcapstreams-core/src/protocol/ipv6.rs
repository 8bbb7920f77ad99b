//! IPv6 protocol decoder with extension header support.

use etherparse::Ipv6HeaderSlice;
use smallvec::SmallVec;

use super::ethernet::ethertype;
use super::ip_protocol::ip_proto;
use super::{Ipv6Layer, Layer, ParseContext, ParseResult, Protocol};

/// Fixed IPv6 header length.
const IPV6_HEADER_LEN: usize = 40;

/// Check if a next header value is an extension header.
fn is_extension_header(nh: u8) -> bool {
    matches!(
        nh,
        ip_proto::HOP_BY_HOP
            | ip_proto::ROUTING
            | ip_proto::FRAGMENT
            | ip_proto::DESTINATION
            | ip_proto::AH
            | ip_proto::MOBILITY
    )
}

/// IPv6 protocol decoder.
#[derive(Debug, Clone, Copy)]
pub struct Ipv6Protocol;

impl Protocol for Ipv6Protocol {
    fn name(&self) -> &'static str {
        "ipv6"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("ethertype") {
            Some(et) if et == ethertype::IPV6 as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        match Ipv6HeaderSlice::from_slice(data) {
            Ok(ipv6) => {
                // Payload length 0 means a jumbogram; keep everything captured
                let payload_len = ipv6.payload_length() as usize;
                let end = if payload_len == 0 {
                    data.len()
                } else {
                    (IPV6_HEADER_LEN + payload_len).min(data.len())
                };
                let payload = &data[IPV6_HEADER_LEN..end];
                let first_next_header = ipv6.next_header().0;

                let chain = walk_extension_headers(first_next_header, payload);

                let mut child_hints = SmallVec::new();
                child_hints.push(("ip_version", 6));
                if chain.fragmented {
                    child_hints.push(("fragment", 1));
                } else if !is_extension_header(chain.next_header) {
                    child_hints.push(("ip_protocol", chain.next_header as u64));
                }

                let layer = Layer::Ipv6(Ipv6Layer {
                    src: ipv6.source_addr(),
                    dst: ipv6.destination_addr(),
                    next_header: first_next_header,
                    upper_protocol: chain.next_header,
                    hop_limit: ipv6.hop_limit(),
                });
                ParseResult::success(layer, &payload[chain.consumed..], child_hints)
            }
            Err(e) => ParseResult::error(format!("IPv6 parse error: {e}"), data),
        }
    }
}

/// Result of walking an extension header chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ExtensionChain {
    /// Protocol following the last extension header.
    next_header: u8,
    /// Bytes of extension headers consumed.
    consumed: usize,
    /// Walk stopped at a fragment header; the rest is fragment data.
    fragmented: bool,
}

fn walk_extension_headers(first_nh: u8, data: &[u8]) -> ExtensionChain {
    let mut chain = ExtensionChain {
        next_header: first_nh,
        consumed: 0,
        fragmented: false,
    };

    while is_extension_header(chain.next_header) && chain.consumed < data.len() {
        let rest = &data[chain.consumed..];
        let parsed = match chain.next_header {
            ip_proto::FRAGMENT => {
                if let Some((nh, len)) = parse_fragment_header(rest) {
                    chain.next_header = nh;
                    chain.consumed += len;
                    chain.fragmented = true;
                }
                break;
            }
            ip_proto::AH => parse_ah_header(rest),
            _ => parse_generic_ext_header(rest),
        };

        match parsed {
            Some((next_nh, consumed)) => {
                chain.next_header = next_nh;
                chain.consumed += consumed;
            }
            None => break,
        }
    }

    chain
}

/// Hop-by-Hop, Routing, Destination Options and Mobility share one length encoding.
/// Returns (next_header, bytes_consumed).
fn parse_generic_ext_header(data: &[u8]) -> Option<(u8, usize)> {
    if data.len() < 2 {
        return None;
    }

    let next_header = data[0];
    // Units of 8 octets, not including the first 8
    let total_len = (data[1] as usize + 1) * 8;

    if data.len() < total_len {
        return None;
    }

    Some((next_header, total_len))
}

/// Fragment header is exactly 8 bytes.
fn parse_fragment_header(data: &[u8]) -> Option<(u8, usize)> {
    if data.len() < 8 {
        return None;
    }

    Some((data[0], 8))
}

/// Authentication Header length is (payload_len + 2) * 4 bytes.
fn parse_ah_header(data: &[u8]) -> Option<(u8, usize)> {
    if data.len() < 8 {
        return None;
    }

    let next_header = data[0];
    let total_len = (data[1] as usize + 2) * 4;

    if data.len() < total_len {
        return None;
    }

    Some((next_header, total_len))
}
