//! DNS protocol decoder.
//!
//! Only the fixed 12-byte header is decoded. Presence of a well-formed
//! header on port 53 is what classification needs.

use smallvec::SmallVec;

use super::ip_protocol::ip_proto;
use super::{DnsLayer, Layer, ParseContext, ParseResult, PayloadMode, Protocol};

/// DNS well-known port.
pub const DNS_PORT: u16 = 53;

/// Fixed DNS header length.
const DNS_HEADER_LEN: usize = 12;

/// DNS protocol decoder.
#[derive(Debug, Clone, Copy)]
pub struct DnsProtocol;

impl Protocol for DnsProtocol {
    fn name(&self) -> &'static str {
        "dns"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        let port = Some(DNS_PORT as u64);
        if context.hint("src_port") == port || context.hint("dst_port") == port {
            Some(100)
        } else {
            None
        }
    }

    fn parse<'a>(&self, data: &'a [u8], context: &ParseContext) -> ParseResult<'a> {
        // DNS over TCP prefixes each message with a 2-byte length
        let message = if context.hint("transport") == Some(ip_proto::TCP as u64) {
            if data.len() < 2 {
                return ParseResult::error("DNS length prefix missing".to_string(), data);
            }
            &data[2..]
        } else {
            data
        };

        if message.len() < DNS_HEADER_LEN {
            return ParseResult::error("DNS header too short".to_string(), data);
        }

        let flags = u16::from_be_bytes([message[2], message[3]]);

        let layer = Layer::Dns(DnsLayer {
            transaction_id: u16::from_be_bytes([message[0], message[1]]),
            // QR bit: 0 = query, 1 = response
            is_response: (flags & 0x8000) != 0,
            opcode: ((flags >> 11) & 0x0F) as u8,
            rcode: (flags & 0x000F) as u8,
            question_count: u16::from_be_bytes([message[4], message[5]]),
            answer_count: u16::from_be_bytes([message[6], message[7]]),
        });

        ParseResult::success(layer, &message[DNS_HEADER_LEN..], SmallVec::new())
    }

    fn payload_mode(&self) -> PayloadMode {
        PayloadMode::None
    }
}
