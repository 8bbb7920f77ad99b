//! 802.1Q VLAN tag decoder.

use smallvec::SmallVec;

use super::ethernet::ethertype;
use super::{Layer, ParseContext, ParseResult, Protocol, VlanLayer};

/// 802.1Q / QinQ decoder.
#[derive(Debug, Clone, Copy)]
pub struct VlanProtocol;

impl Protocol for VlanProtocol {
    fn name(&self) -> &'static str {
        "vlan"
    }

    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        match context.hint("ethertype") {
            Some(etype)
                if etype == ethertype::VLAN as u64
                    || etype == ethertype::QINQ as u64
                    || etype == ethertype::QINQ_OLD as u64 =>
            {
                Some(100)
            }
            _ => None,
        }
    }

    fn parse<'a>(&self, data: &'a [u8], _context: &ParseContext) -> ParseResult<'a> {
        // The TPID was consumed by the outer header; TCI and inner EtherType remain
        if data.len() < 4 {
            return ParseResult::error("VLAN tag too short".to_string(), data);
        }

        let tci = u16::from_be_bytes([data[0], data[1]]);
        let inner_ethertype = u16::from_be_bytes([data[2], data[3]]);

        let mut child_hints = SmallVec::new();
        child_hints.push(("ethertype", inner_ethertype as u64));

        let layer = Layer::Vlan(VlanLayer {
            vlan_id: tci & 0x0FFF,
            priority: ((tci >> 13) & 0x07) as u8,
            ethertype: inner_ethertype,
        });
        ParseResult::success(layer, &data[4..], child_hints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vlan_tag() {
        // PCP=5, VID=100, inner IPv4
        let data = [0xa0, 0x64, 0x08, 0x00, 0x45];
        let mut ctx = ParseContext::new(1);
        ctx.parent_protocol = Some("ethernet");
        ctx.set_hint("ethertype", ethertype::VLAN as u64);

        assert_eq!(VlanProtocol.can_parse(&ctx), Some(100));

        let result = VlanProtocol.parse(&data, &ctx);
        assert!(result.is_ok());
        assert_eq!(result.remaining, &[0x45]);
        assert_eq!(result.hint("ethertype"), Some(ethertype::IPV4 as u64));
        assert_eq!(
            result.layer,
            Some(Layer::Vlan(VlanLayer {
                vlan_id: 100,
                priority: 5,
                ethertype: ethertype::IPV4,
            }))
        );
    }

    #[test]
    fn test_vlan_too_short() {
        let result = VlanProtocol.parse(&[0x00, 0x01], &ParseContext::new(1));
        assert!(!result.is_ok());
    }
}
