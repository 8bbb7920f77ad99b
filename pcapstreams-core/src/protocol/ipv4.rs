//! IPv4 protocol decoder.

use smallvec::SmallVec;

use etherparse::Ipv4HeaderSlice;

use super::ethernet::ethertype;
use super::{Ipv4Layer, Layer, ParseContext, ParseResult, Protocol};

/// IPv4 protocol decoder.
#[derive(Debug, Clone, Copy)]
pub struct Ipv4Protocol;

impl Protocol for Ipv4Protocol {
    fn name(&self) -> &'static str {
        "ipv4"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("ethertype") {
            Some(et) if et == ethertype::IPV4 as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        match Ipv4HeaderSlice::from_slice(data) {
            Ok(ipv4) => {
                let protocol = ipv4.protocol().0;
                let header_len = ipv4.slice().len();

                // Drop link-layer padding past the datagram's total length
                let total_len = ipv4.total_len() as usize;
                let end = if total_len >= header_len {
                    total_len.min(data.len())
                } else {
                    data.len()
                };

                let mut child_hints = SmallVec::new();
                child_hints.push(("ip_version", 4));
                // Any piece of a fragmented datagram is left undecoded
                if ipv4.more_fragments() || ipv4.fragments_offset().value() != 0 {
                    child_hints.push(("fragment", 1));
                } else {
                    child_hints.push(("ip_protocol", protocol as u64));
                }

                let layer = Layer::Ipv4(Ipv4Layer {
                    src: ipv4.source_addr(),
                    dst: ipv4.destination_addr(),
                    protocol,
                    ttl: ipv4.ttl(),
                });
                ParseResult::success(layer, &data[header_len..end], child_hints)
            }
            Err(e) => ParseResult::error(format!("IPv4 parse error: {e}"), data),
        }
    }
}
