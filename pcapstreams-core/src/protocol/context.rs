//! Parse context and result types.
//!
//! A [`ParseContext`] carries what the previous layer learned about the next
//! one (ethertype, IP protocol, ports) as a small list of hints. Decoders
//! read hints in [`Protocol::can_parse`](super::Protocol::can_parse) and
//! publish new ones through [`ParseResult::child_hints`].

use smallvec::SmallVec;

use super::Layer;

/// A single hint passed from a parent layer to its children.
pub type HintEntry = (&'static str, u64);

/// State carried between protocol layers during a decode pass.
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// Link type of the capture (1 = Ethernet, 113 = Linux SLL, ...).
    pub link_type: u16,

    /// Name of the protocol that produced the current bytes, `None` at the root.
    pub parent_protocol: Option<&'static str>,

    /// Hints from the parent layer.
    pub hints: SmallVec<[HintEntry; 4]>,

    /// Byte offset of the current layer within the frame.
    pub offset: usize,
}

impl ParseContext {
    /// Create a root context for a frame of the given link type.
    pub fn new(link_type: u16) -> Self {
        Self {
            link_type,
            parent_protocol: None,
            hints: SmallVec::new(),
            offset: 0,
        }
    }

    /// Look up a hint by key.
    #[inline]
    pub fn hint(&self, key: &str) -> Option<u64> {
        self.hints.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    /// Set a hint, replacing any previous value.
    #[inline]
    pub fn set_hint(&mut self, key: &'static str, value: u64) {
        if let Some(entry) = self.hints.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.hints.push((key, value));
        }
    }

    /// True when no layer has been decoded yet.
    pub fn is_root(&self) -> bool {
        self.parent_protocol.is_none()
    }
}

/// Outcome of decoding one layer.
#[derive(Debug, Clone)]
pub struct ParseResult<'data> {
    /// The decoded layer, absent when the bytes did not match.
    pub layer: Option<Layer<'data>>,

    /// Bytes left for the next layer.
    pub remaining: &'data [u8],

    /// Hints for the next layer.
    pub child_hints: SmallVec<[HintEntry; 4]>,

    /// Why decoding stopped, if it did.
    pub error: Option<String>,
}

impl<'data> ParseResult<'data> {
    pub fn success(
        layer: Layer<'data>,
        remaining: &'data [u8],
        child_hints: SmallVec<[HintEntry; 4]>,
    ) -> Self {
        Self {
            layer: Some(layer),
            remaining,
            child_hints,
            error: None,
        }
    }

    pub fn error(error: String, remaining: &'data [u8]) -> Self {
        Self {
            layer: None,
            remaining,
            child_hints: SmallVec::new(),
            error: Some(error),
        }
    }

    pub fn hint(&self, name: &str) -> Option<u64> {
        self.child_hints
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| *v)
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_hint_replaces() {
        let mut ctx = ParseContext::new(1);
        assert!(ctx.is_root());
        assert_eq!(ctx.hint("ethertype"), None);

        ctx.set_hint("ethertype", 0x0800);
        ctx.set_hint("ethertype", 0x86dd);
        assert_eq!(ctx.hint("ethertype"), Some(0x86dd));
        assert_eq!(ctx.hints.len(), 1);
    }

    #[test]
    fn test_error_result_keeps_bytes() {
        let data = [1u8, 2, 3];
        let result = ParseResult::error("too short".to_string(), &data);
        assert!(!result.is_ok());
        assert!(result.layer.is_none());
        assert_eq!(result.remaining, &data);
        assert_eq!(result.hint("ip_protocol"), None);
    }
}
