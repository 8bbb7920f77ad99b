//! Conversation keys.

use std::borrow::Borrow;
use std::fmt;

use serde::Serialize;

use crate::record::PacketRecord;

/// Separator between the two endpoints of a key.
const ARROW: &str = " -> ";

/// Directional conversation key, `"srcAddr:srcPort -> dstAddr:dstPort"`.
///
/// Endpoints are joined verbatim; IPv6 addresses are not bracketed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConversationKey(String);

impl ConversationKey {
    /// Key from explicit endpoints, in the given direction.
    pub fn new(src_ip: &str, src_port: u16, dst_ip: &str, dst_port: u16) -> Self {
        Self(format!("{src_ip}:{src_port}{ARROW}{dst_ip}:{dst_port}"))
    }

    /// Key in the record's own direction.
    pub fn forward(record: &PacketRecord) -> Self {
        Self::new(&record.src_ip, record.src_port, &record.dst_ip, record.dst_port)
    }

    /// Key with the record's endpoints swapped.
    pub fn reverse(record: &PacketRecord) -> Self {
        Self::new(&record.dst_ip, record.dst_port, &record.src_ip, record.src_port)
    }

    /// The same conversation seen from the other endpoint.
    pub fn reversed(&self) -> Self {
        match self.0.split_once(ARROW) {
            Some((src, dst)) => Self(format!("{dst}{ARROW}{src}")),
            None => self.clone(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ConversationKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ConversationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ConversationKey> for String {
    fn from(key: ConversationKey) -> Self {
        key.0
    }
}
