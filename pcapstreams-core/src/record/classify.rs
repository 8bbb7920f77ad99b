//! Coarse packet classification.

use serde::{Serialize, Serializer};

use crate::protocol::DecodedFrame;

/// Category label assigned to each packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Dns,
    Tcp,
    Udp,
    Icmp,
    Application,
    Unknown,
}

impl Classification {
    /// Classify a decoded frame. First match wins:
    /// DNS, TCP, UDP, ICMP (v4 or v6), any application payload, unknown.
    ///
    /// A DNS message carried over TCP is therefore labelled DNS.
    pub fn of(frame: &DecodedFrame<'_>) -> Self {
        if frame.dns().is_some() {
            Classification::Dns
        } else if frame.tcp().is_some() {
            Classification::Tcp
        } else if frame.udp().is_some() {
            Classification::Udp
        } else if frame.icmpv4().is_some() || frame.icmpv6().is_some() {
            Classification::Icmp
        } else if frame.has_application() {
            Classification::Application
        } else {
            Classification::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Dns => "DNS Query Detected",
            Classification::Tcp => "TCP Packet",
            Classification::Udp => "UDP Packet",
            Classification::Icmp => "ICMP Packet",
            Classification::Application => "Application Layer Data",
            Classification::Unknown => "Unknown Packet Type",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Classification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
