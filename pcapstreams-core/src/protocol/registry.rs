//! Protocol registry for managing decoders.

use super::{
    DnsProtocol, EthernetProtocol, FragmentProtocol, IcmpProtocol, Icmpv6Protocol, Ipv4Protocol,
    Ipv6Protocol, LinuxSllProtocol, ParseContext, ParseResult, TcpProtocol, UdpProtocol,
    VlanProtocol,
};

/// How a protocol's remaining bytes should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadMode {
    /// Pass remaining bytes to child decoders; drop them if none matches.
    Chain,

    /// Pass remaining bytes to child decoders; if none matches they become
    /// a [`Layer::Payload`](super::Layer::Payload).
    Payload,

    /// Terminal protocol. Decoding stops after this layer.
    None,
}

/// Core trait all protocol decoders implement.
pub trait Protocol: Send + Sync {
    /// Unique identifier for this protocol (e.g., "tcp", "dns").
    fn name(&self) -> &'static str;

    /// Check if this decoder can handle the given context.
    /// Returns a priority score (higher = more specific match), or `None`.
    fn can_parse(&self, context: &ParseContext) -> Option<u32>;

    /// Decode one layer from the front of `data`.
    fn parse<'a>(&self, data: &'a [u8], context: &ParseContext) -> ParseResult<'a>;

    /// How should remaining bytes be handled after decoding?
    fn payload_mode(&self) -> PayloadMode {
        PayloadMode::Chain
    }
}

/// Enum of all built-in protocol decoders.
///
/// Static dispatch for every built-in protocol, no vtable.
#[derive(Debug, Clone, Copy)]
pub enum BuiltinProtocol {
    Ethernet(EthernetProtocol),
    LinuxSll(LinuxSllProtocol),
    Vlan(VlanProtocol),
    Ipv4(Ipv4Protocol),
    Ipv6(Ipv6Protocol),
    Tcp(TcpProtocol),
    Udp(UdpProtocol),
    Icmp(IcmpProtocol),
    Icmpv6(Icmpv6Protocol),
    Dns(DnsProtocol),
    Fragment(FragmentProtocol),
}

/// Macro to delegate Protocol trait methods to inner types.
macro_rules! delegate_protocol {
    ($self:expr, $method:ident $(, $arg:expr)*) => {
        match $self {
            BuiltinProtocol::Ethernet(p) => p.$method($($arg),*),
            BuiltinProtocol::LinuxSll(p) => p.$method($($arg),*),
            BuiltinProtocol::Vlan(p) => p.$method($($arg),*),
            BuiltinProtocol::Ipv4(p) => p.$method($($arg),*),
            BuiltinProtocol::Ipv6(p) => p.$method($($arg),*),
            BuiltinProtocol::Tcp(p) => p.$method($($arg),*),
            BuiltinProtocol::Udp(p) => p.$method($($arg),*),
            BuiltinProtocol::Icmp(p) => p.$method($($arg),*),
            BuiltinProtocol::Icmpv6(p) => p.$method($($arg),*),
            BuiltinProtocol::Dns(p) => p.$method($($arg),*),
            BuiltinProtocol::Fragment(p) => p.$method($($arg),*),
        }
    };
}

impl Protocol for BuiltinProtocol {
    #[inline]
    fn name(&self) -> &'static str {
        delegate_protocol!(self, name)
    }

    #[inline]
    fn can_parse(&self, context: &ParseContext) -> Option<u32> {
        delegate_protocol!(self, can_parse, context)
    }

    #[inline]
    fn parse<'a>(&self, data: &'a [u8], context: &ParseContext) -> ParseResult<'a> {
        delegate_protocol!(self, parse, data, context)
    }

    #[inline]
    fn payload_mode(&self) -> PayloadMode {
        delegate_protocol!(self, payload_mode)
    }
}

macro_rules! impl_from_protocol {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for BuiltinProtocol {
                fn from(p: $ty) -> Self {
                    BuiltinProtocol::$variant(p)
                }
            }
        )*
    };
}

impl_from_protocol! {
    EthernetProtocol => Ethernet,
    LinuxSllProtocol => LinuxSll,
    VlanProtocol => Vlan,
    Ipv4Protocol => Ipv4,
    Ipv6Protocol => Ipv6,
    TcpProtocol => Tcp,
    UdpProtocol => Udp,
    IcmpProtocol => Icmp,
    Icmpv6Protocol => Icmpv6,
    DnsProtocol => Dns,
    FragmentProtocol => Fragment,
}

/// Registry for protocol decoders with priority-based selection.
#[derive(Debug, Clone)]
pub struct ProtocolRegistry {
    parsers: Vec<BuiltinProtocol>,
}

impl ProtocolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// Register a protocol decoder.
    pub fn register<P: Into<BuiltinProtocol>>(&mut self, parser: P) {
        self.parsers.push(parser.into());
    }

    /// Find the best decoder for the given context.
    #[inline]
    pub fn find_parser(&self, context: &ParseContext) -> Option<&BuiltinProtocol> {
        self.parsers
            .iter()
            .filter_map(|p| p.can_parse(context).map(|priority| (p, priority)))
            .max_by_key(|(_, priority)| *priority)
            .map(|(parser, _)| parser)
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }
}

impl Default for ProtocolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_protocol_size() {
        // All decoders are unit structs, so the enum is just the discriminant
        let size = std::mem::size_of::<BuiltinProtocol>();
        assert!(size <= 8, "BuiltinProtocol is {} bytes, expected <= 8", size);
    }

    #[test]
    fn test_registry_static_dispatch() {
        let mut registry = ProtocolRegistry::new();
        registry.register(EthernetProtocol);
        registry.register(Ipv4Protocol);
        registry.register(TcpProtocol);

        assert_eq!(registry.len(), 3);

        let ctx = ParseContext::new(1);
        let parser = registry.find_parser(&ctx);
        assert_eq!(parser.map(|p| p.name()), Some("ethernet"));
    }

    #[test]
    fn test_fragment_hint_selects_fragment_decoder() {
        let mut registry = ProtocolRegistry::new();
        registry.register(UdpProtocol);
        registry.register(FragmentProtocol);

        let mut ctx = ParseContext::new(1);
        ctx.set_hint("fragment", 1);
        let parser = registry.find_parser(&ctx);
        assert_eq!(parser.map(|p| p.name()), Some("fragment"));
    }

    #[test]
    fn test_payload_modes() {
        assert_eq!(EthernetProtocol.payload_mode(), PayloadMode::Chain);
        assert_eq!(TcpProtocol.payload_mode(), PayloadMode::Payload);
        assert_eq!(DnsProtocol.payload_mode(), PayloadMode::None);
        assert_eq!(FragmentProtocol.payload_mode(), PayloadMode::None);
    }
}
