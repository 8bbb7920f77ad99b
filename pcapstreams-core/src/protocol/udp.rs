//! UDP protocol decoder.

use smallvec::SmallVec;

use etherparse::UdpHeaderSlice;

use super::ip_protocol::ip_proto;
use super::{Layer, ParseContext, ParseResult, PayloadMode, Protocol, UdpLayer};

/// UDP header is always 8 bytes.
const UDP_HEADER_LEN: usize = 8;

/// UDP protocol decoder.
#[derive(Debug, Clone, Copy)]
pub struct UdpProtocol;

impl Protocol for UdpProtocol {
    fn name(&self) -> &'static str {
        "udp"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("ip_protocol") {
            Some(proto) if proto == ip_proto::UDP as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        match UdpHeaderSlice::from_slice(data) {
            Ok(udp) => {
                let mut child_hints = SmallVec::new();
                child_hints.push(("src_port", udp.source_port() as u64));
                child_hints.push(("dst_port", udp.destination_port() as u64));
                child_hints.push(("transport", ip_proto::UDP as u64));

                let payload = &data[UDP_HEADER_LEN..];
                let layer = Layer::Udp(UdpLayer {
                    src_port: udp.source_port(),
                    dst_port: udp.destination_port(),
                    payload,
                });
                ParseResult::success(layer, payload, child_hints)
            }
            Err(e) => ParseResult::error(format!("UDP parse error: {e}"), data),
        }
    }

    fn payload_mode(&self) -> PayloadMode {
        PayloadMode::Payload
    }
}
