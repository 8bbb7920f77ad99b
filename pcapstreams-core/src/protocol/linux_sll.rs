//! Linux SLL (cooked capture) decoder.
//!
//! Captures taken on the "any" interface carry a 16-byte pseudo header
//! instead of an Ethernet header (LINKTYPE_LINUX_SLL = 113).

use smallvec::SmallVec;

use super::link_type::LINKTYPE_LINUX_SLL;
use super::{Layer, LinuxSllLayer, ParseContext, ParseResult, Protocol};

/// Linux SLL header length in bytes.
pub const LINUX_SLL_HEADER_LEN: usize = 16;

/// ARPHRD types whose protocol field is an EtherType.
mod arphrd {
    pub const ETHER: u16 = 1;
    pub const LOOPBACK: u16 = 772;
    pub const IPGRE: u16 = 778;
    pub const NONE: u16 = 0xFFFE;
}

/// Linux SLL decoder.
#[derive(Debug, Clone, Copy)]
pub struct LinuxSllProtocol;

impl Protocol for LinuxSllProtocol {
    fn name(&self) -> &'static str {
        "linux_sll"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        if context.is_root() && context.link_type == LINKTYPE_LINUX_SLL {
            return Some(100);
        }
        None
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        if data.len() < LINUX_SLL_HEADER_LEN {
            return ParseResult::error(
                format!("Linux SLL header too short: {} bytes", data.len()),
                data,
            );
        }

        // All fields big-endian; bytes 4..14 hold the address length and address
        let packet_type = u16::from_be_bytes([data[0], data[1]]);
        let arphrd_type = u16::from_be_bytes([data[2], data[3]]);
        let protocol = u16::from_be_bytes([data[14], data[15]]);

        let mut child_hints = SmallVec::new();
        if matches!(
            arphrd_type,
            arphrd::ETHER | arphrd::LOOPBACK | arphrd::IPGRE | arphrd::NONE
        ) {
            child_hints.push(("ethertype", protocol as u64));
        }

        let layer = Layer::LinuxSll(LinuxSllLayer {
            packet_type,
            protocol,
        });
        ParseResult::success(layer, &data[LINUX_SLL_HEADER_LEN..], child_hints)
    }
}
