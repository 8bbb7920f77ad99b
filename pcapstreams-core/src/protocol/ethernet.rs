//! Ethernet II protocol decoder.

use smallvec::SmallVec;

use etherparse::Ethernet2HeaderSlice;

use super::link_type::LINKTYPE_ETHERNET;
use super::{EthernetLayer, Layer, ParseContext, ParseResult, Protocol};

/// EtherType values the decoders act on.
pub mod ethertype {
    pub const IPV4: u16 = 0x0800;
    pub const ARP: u16 = 0x0806;
    pub const VLAN: u16 = 0x8100;
    pub const IPV6: u16 = 0x86DD;
    pub const QINQ: u16 = 0x88A8;
    pub const QINQ_OLD: u16 = 0x9100;
}

/// Ethernet II protocol decoder.
#[derive(Debug, Clone, Copy)]
pub struct EthernetProtocol;

impl Protocol for EthernetProtocol {
    fn name(&self) -> &'static str {
        "ethernet"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        if context.is_root() && context.link_type == LINKTYPE_ETHERNET {
            return Some(100);
        }
        None
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        match Ethernet2HeaderSlice::from_slice(data) {
            Ok(eth) => {
                let ethertype = eth.ether_type().0;

                let mut child_hints = SmallVec::new();
                child_hints.push(("ethertype", ethertype as u64));

                let layer = Layer::Ethernet(EthernetLayer {
                    src_mac: eth.source(),
                    dst_mac: eth.destination(),
                    ethertype,
                });

                let header_len = eth.slice().len();
                ParseResult::success(layer, &data[header_len..], child_hints)
            }
            Err(e) => ParseResult::error(format!("Ethernet parse error: {e}"), data),
        }
    }
}
