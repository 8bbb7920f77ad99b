//! ICMP (v4) protocol decoder.

use smallvec::SmallVec;

use super::ip_protocol::ip_proto;
use super::{IcmpLayer, Layer, ParseContext, ParseResult, PayloadMode, Protocol};

/// ICMP header is at least 8 bytes (type, code, checksum, rest of header).
const ICMP_HEADER_LEN: usize = 8;

/// ICMP message types seen most often.
#[allow(dead_code)]
pub mod icmp_type {
    pub const ECHO_REPLY: u8 = 0;
    pub const DEST_UNREACHABLE: u8 = 3;
    pub const REDIRECT: u8 = 5;
    pub const ECHO_REQUEST: u8 = 8;
    pub const TIME_EXCEEDED: u8 = 11;
}

/// ICMP protocol decoder.
#[derive(Debug, Clone, Copy)]
pub struct IcmpProtocol;

impl Protocol for IcmpProtocol {
    fn name(&self) -> &'static str {
        "icmp"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("ip_protocol") {
            Some(proto) if proto == ip_proto::ICMP as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        if data.len() < ICMP_HEADER_LEN {
            return ParseResult::error(
                format!("ICMP header too short: {} bytes", data.len()),
                data,
            );
        }

        let layer = Layer::Icmpv4(IcmpLayer {
            icmp_type: data[0],
            code: data[1],
        });
        ParseResult::success(layer, &data[ICMP_HEADER_LEN..], SmallVec::new())
    }

    fn payload_mode(&self) -> PayloadMode {
        PayloadMode::Payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::test_utils::IcmpBuilder;

    #[test]
    fn test_parse_echo_request() {
        let packet = IcmpBuilder::new()
            .echo_request()
            .identifier(0x1234)
            .sequence(1)
            .payload(b"ping".to_vec())
            .build();

        let mut ctx = ParseContext::new(1);
        ctx.set_hint("ip_protocol", ip_proto::ICMP as u64);
        assert_eq!(IcmpProtocol.can_parse(&ctx), Some(100));

        let result = IcmpProtocol.parse(&packet, &ctx);
        assert!(result.is_ok());
        assert_eq!(result.remaining, b"ping");
        assert_eq!(
            result.layer,
            Some(Layer::Icmpv4(IcmpLayer {
                icmp_type: icmp_type::ECHO_REQUEST,
                code: 0,
            }))
        );
    }

    #[test]
    fn test_parse_icmp_too_short() {
        let result = IcmpProtocol.parse(&[0x08, 0x00, 0x00], &ParseContext::new(1));
        assert!(!result.is_ok());
    }
}
