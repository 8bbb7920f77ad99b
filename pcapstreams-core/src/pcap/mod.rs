//! PCAP file reading module.
//!
//! This module handles reading PCAP and PCAPNG files and
//! exposing raw frames to the ingestion driver.

mod packet;
mod reader;

pub use packet::RawPacket;
pub use reader::{Compression, PcapReader};
