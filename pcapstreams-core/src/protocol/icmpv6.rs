//! ICMPv6 protocol decoder.

use smallvec::SmallVec;

use super::ip_protocol::ip_proto;
use super::{IcmpLayer, Layer, ParseContext, ParseResult, PayloadMode, Protocol};

/// ICMPv6 header is at least 4 bytes (type, code, checksum).
const ICMPV6_HEADER_LEN: usize = 4;

/// ICMPv6 protocol decoder.
#[derive(Debug, Clone, Copy)]
pub struct Icmpv6Protocol;

impl Protocol for Icmpv6Protocol {
    fn name(&self) -> &'static str {
        "icmpv6"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match (context.hint("ip_protocol"), context.hint("ip_version")) {
            (Some(proto), Some(6)) if proto == ip_proto::ICMPV6 as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        if data.len() < ICMPV6_HEADER_LEN {
            return ParseResult::error(
                format!("ICMPv6 header too short: {} bytes", data.len()),
                data,
            );
        }

        let layer = Layer::Icmpv6(IcmpLayer {
            icmp_type: data[0],
            code: data[1],
        });
        ParseResult::success(layer, &data[ICMPV6_HEADER_LEN..], SmallVec::new())
    }

    fn payload_mode(&self) -> PayloadMode {
        PayloadMode::Payload
    }
}
