//! IP fragment payload.
//!
//! A fragmented datagram's body is not decoded further. Its bytes surface as
//! an opaque [`Layer::Payload`] instead of a transport layer, so fragments
//! carry no ports and classify as application data.

use smallvec::SmallVec;

use super::{Layer, ParseContext, ParseResult, PayloadMode, Protocol};

/// Decoder for the body of a fragmented IPv4 or IPv6 datagram.
#[derive(Debug, Clone, Copy)]
pub struct FragmentProtocol;

impl Protocol for FragmentProtocol {
    fn name(&self) -> &'static str {
        "fragment"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("fragment") {
            Some(1) => Some(100),
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        ParseResult::success(Layer::Payload(data), &[], SmallVec::new())
    }

    fn payload_mode(&self) -> PayloadMode {
        PayloadMode::None
    }
}
