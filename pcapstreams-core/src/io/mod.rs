//! Packet I/O abstractions.
//!
//! The ingestion driver reads frames through [`PacketReader`] so it can be
//! driven by a capture file ([`PcapReader`]) or by any other frame source.

use crate::error::Error;
use crate::pcap::{PcapReader, RawPacket};

/// Sequential reader of frames from a capture source.
pub trait PacketReader: Send {
    /// Read the next frame.
    ///
    /// Returns `Ok(None)` at end of source. An `Err` is unrecoverable; the
    /// caller should stop reading.
    fn next_packet(&mut self) -> Result<Option<RawPacket>, Error>;

    /// Link type for frames from this reader.
    fn link_type(&self) -> u16;
}

impl PacketReader for PcapReader {
    #[inline]
    fn next_packet(&mut self) -> Result<Option<RawPacket>, Error> {
        PcapReader::next_packet(self)
    }

    fn link_type(&self) -> u16 {
        PcapReader::link_type(self)
    }
}
