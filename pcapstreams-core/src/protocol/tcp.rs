//! TCP protocol decoder.

use smallvec::SmallVec;

use etherparse::TcpHeaderSlice;

use super::ip_protocol::ip_proto;
use super::{tcp_flags, Layer, ParseContext, ParseResult, PayloadMode, Protocol, TcpLayer};

/// TCP protocol decoder.
#[derive(Debug, Clone, Copy)]
pub struct TcpProtocol;

impl Protocol for TcpProtocol {
    fn name(&self) -> &'static str {
        "tcp"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("ip_protocol") {
            Some(proto) if proto == ip_proto::TCP as u64 => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        match TcpHeaderSlice::from_slice(data) {
            Ok(tcp) => {
                let mut flags = 0u8;
                if tcp.fin() {
                    flags |= tcp_flags::FIN;
                }
                if tcp.syn() {
                    flags |= tcp_flags::SYN;
                }
                if tcp.rst() {
                    flags |= tcp_flags::RST;
                }
                if tcp.psh() {
                    flags |= tcp_flags::PSH;
                }
                if tcp.ack() {
                    flags |= tcp_flags::ACK;
                }
                if tcp.urg() {
                    flags |= tcp_flags::URG;
                }

                let mut child_hints = SmallVec::new();
                child_hints.push(("src_port", tcp.source_port() as u64));
                child_hints.push(("dst_port", tcp.destination_port() as u64));
                child_hints.push(("transport", ip_proto::TCP as u64));

                let payload = &data[tcp.slice().len()..];
                let layer = Layer::Tcp(TcpLayer {
                    src_port: tcp.source_port(),
                    dst_port: tcp.destination_port(),
                    seq: tcp.sequence_number(),
                    ack: tcp.acknowledgment_number(),
                    flags,
                    payload,
                });
                ParseResult::success(layer, payload, child_hints)
            }
            Err(e) => ParseResult::error(format!("TCP parse error: {e}"), data),
        }
    }

    fn payload_mode(&self) -> PayloadMode {
        PayloadMode::Payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::test_utils::TcpBuilder;

    fn tcp_context() -> ParseContext {
        let mut ctx = ParseContext::new(1);
        ctx.set_hint("ip_protocol", ip_proto::TCP as u64);
        ctx
    }

    #[test]
    fn test_parse_syn() {
        let segment = TcpBuilder::new()
            .src_port(1111)
            .dst_port(80)
            .seq(1000)
            .syn()
            .build();

        let ctx = tcp_context();
        assert_eq!(TcpProtocol.can_parse(&ctx), Some(100));

        let result = TcpProtocol.parse(&segment, &ctx);
        assert!(result.is_ok());
        assert!(result.remaining.is_empty());
        assert_eq!(result.hint("src_port"), Some(1111));
        assert_eq!(result.hint("dst_port"), Some(80));

        match result.layer {
            Some(Layer::Tcp(tcp)) => {
                assert_eq!(tcp.seq, 1000);
                assert_eq!(tcp.flags, tcp_flags::SYN);
                assert!(tcp.payload.is_empty());
            }
            other => panic!("expected tcp layer, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_with_payload() {
        let segment = TcpBuilder::new()
            .psh_ack()
            .payload(b"GET /".to_vec())
            .build();

        let result = TcpProtocol.parse(&segment, &tcp_context());
        match result.layer {
            Some(Layer::Tcp(tcp)) => {
                assert_eq!(tcp.payload, b"GET /");
                assert_eq!(tcp.flags, tcp_flags::PSH | tcp_flags::ACK);
            }
            other => panic!("expected tcp layer, got {other:?}"),
        }
        assert_eq!(result.remaining, b"GET /");
    }

    #[test]
    fn test_parse_tcp_too_short() {
        let result = TcpProtocol.parse(&[0x04, 0x57, 0x00], &tcp_context());
        assert!(!result.is_ok());
        assert!(result.layer.is_none());
    }

    #[test]
    fn test_not_for_udp() {
        let mut ctx = ParseContext::new(1);
        ctx.set_hint("ip_protocol", ip_proto::UDP as u64);
        assert_eq!(TcpProtocol.can_parse(&ctx), None);
    }
}
