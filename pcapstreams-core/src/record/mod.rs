//! Normalized packet records.
//!
//! Every captured frame becomes exactly one [`PacketRecord`]. Records are
//! immutable once built and are shared between conversation keys through
//! `Arc`.

mod classify;
mod normalize;

use serde::Serialize;

pub use classify::Classification;
pub use normalize::{normalize, RecordNormalizer};

/// One decoded frame in canonical form.
///
/// Field names match the JSON the HTTP API serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketRecord {
    /// 1-based position in the capture file.
    pub index: u64,

    /// Capture time rendered as text.
    pub timestamp: String,

    /// Network source address, empty without an IP layer.
    pub src_ip: String,

    /// Transport source port, 0 without TCP/UDP.
    pub src_port: u16,

    pub dst_ip: String,

    pub dst_port: u16,

    /// "TCP", "UDP", the IP protocol name, or empty.
    pub protocol: String,

    /// Captured frame length in bytes.
    pub length: usize,

    /// Lowercase hex of a non-empty TCP payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_hex: Option<String>,

    /// The same TCP payload as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_ascii: Option<String>,

    #[serde(rename = "info")]
    pub classification: Classification,
}
