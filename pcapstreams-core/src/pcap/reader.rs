//! PCAP file reader.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{LegacyPcapReader, PcapBlockOwned, PcapError, PcapNGReader};

use super::RawPacket;
use crate::error::{Error, PcapError as OurPcapError};

/// Buffer size for reading PCAP files (64KB).
const BUFFER_SIZE: usize = 65536;

/// Compression wrapped around a capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// No compression
    None,
    /// Gzip (.gz)
    Gzip,
    /// Zstandard (.zst)
    #[cfg(feature = "compress-zstd")]
    Zstd,
}

impl Compression {
    /// Detect compression format from magic bytes.
    pub fn detect(data: &[u8]) -> Self {
        match data {
            // Gzip: 1f 8b
            [0x1f, 0x8b, ..] => Compression::Gzip,

            // Zstd: 28 b5 2f fd
            #[cfg(feature = "compress-zstd")]
            [0x28, 0xb5, 0x2f, 0xfd, ..] => Compression::Zstd,

            _ => Compression::None,
        }
    }

    fn wrap(self, file: File) -> Result<Box<dyn Read + Send>, Error> {
        Ok(match self {
            Compression::None => Box::new(file),
            Compression::Gzip => Box::new(GzDecoder::new(file)),
            #[cfg(feature = "compress-zstd")]
            Compression::Zstd => Box::new(zstd::Decoder::new(file)?),
        })
    }
}

/// Legacy PCAP flavour, derived from the magic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimePrecision {
    Micro,
    Nano,
}

/// Reader for PCAP and PCAPNG files, with optional decompression.
pub struct PcapReader {
    inner: ReaderInner,
    frame_number: u64,
    link_type: u16,
}

enum ReaderInner {
    Legacy {
        reader: LegacyPcapReader<BoxedRead>,
        precision: TimePrecision,
    },
    Ng {
        reader: PcapNGReader<BoxedRead>,
        interfaces: Vec<Interface>,
    },
}

/// Link type and clock of one PCAPNG interface, in IDB order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Interface {
    link_type: u16,
    /// Timestamp units per second (`if_tsresol`).
    units_per_sec: u64,
    /// Seconds added to every timestamp (`if_tsoffset`).
    offset_secs: i64,
}

impl Interface {
    fn timestamp_ns(&self, ts_high: u32, ts_low: u32) -> i64 {
        let ts = ((ts_high as u128) << 32) | ts_low as u128;
        let units = self.units_per_sec.max(1) as u128;

        let secs = (ts / units) as i128 + self.offset_secs as i128;
        let frac_ns = ((ts % units) * 1_000_000_000 / units) as i128;
        let ns = secs * 1_000_000_000 + frac_ns;

        ns.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

impl PcapReader {
    /// Open a PCAP file for reading.
    ///
    /// Automatically detects and decompresses gzipped (and, with the
    /// `compress-zstd` feature, zstd) files.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();

        let compression = detect_compression(path)?;

        // Peek at magic number to determine PCAP format
        let mut magic = [0u8; 4];
        {
            let mut peek = BufReader::new(compression.wrap(open_file(path)?)?);
            peek.read_exact(&mut magic).map_err(|_| {
                Error::Pcap(OurPcapError::InvalidFormat {
                    reason: "File too short to read magic number".to_string(),
                })
            })?;
        }

        // Re-open file since we consumed the magic bytes
        let buf_reader = BufReader::with_capacity(BUFFER_SIZE, compression.wrap(open_file(path)?)?);

        match &magic {
            // PCAP magic (little endian / big endian)
            [0xd4, 0xc3, 0xb2, 0xa1] | [0xa1, 0xb2, 0xc3, 0xd4] => {
                Self::open_legacy(buf_reader, TimePrecision::Micro)
            }
            // PCAP nanosecond (little endian / big endian)
            [0x4d, 0x3c, 0xb2, 0xa1] | [0xa1, 0xb2, 0x3c, 0x4d] => {
                Self::open_legacy(buf_reader, TimePrecision::Nano)
            }
            // PCAPNG
            [0x0a, 0x0d, 0x0d, 0x0a] => Self::open_ng(buf_reader),
            _ => Err(Error::Pcap(OurPcapError::InvalidFormat {
                reason: format!("Unknown magic number: {magic:02x?}"),
            })),
        }
    }

    fn open_legacy(
        reader: BoxedRead,
        precision: TimePrecision,
    ) -> Result<Self, Error> {
        let pcap_reader = LegacyPcapReader::new(BUFFER_SIZE, reader).map_err(|e| {
            Error::Pcap(OurPcapError::InvalidFormat {
                reason: format!("Failed to parse PCAP header: {e}"),
            })
        })?;

        Ok(Self {
            inner: ReaderInner::Legacy {
                reader: pcap_reader,
                precision,
            },
            frame_number: 0,
            link_type: 1, // Default to Ethernet, updated from the file header
        })
    }

    fn open_ng(reader: BoxedRead) -> Result<Self, Error> {
        let pcap_reader = PcapNGReader::new(BUFFER_SIZE, reader).map_err(|e| {
            Error::Pcap(OurPcapError::InvalidFormat {
                reason: format!("Failed to parse PCAPNG header: {e}"),
            })
        })?;

        Ok(Self {
            inner: ReaderInner::Ng {
                reader: pcap_reader,
                interfaces: Vec::new(),
            },
            frame_number: 0,
            link_type: 1, // Updated from the first interface description block
        })
    }

    /// Get the link type of the capture (the first interface's, for PCAPNG).
    pub fn link_type(&self) -> u16 {
        self.link_type
    }

    /// Read the next packet.
    ///
    /// Returns `Ok(None)` at end of file.
    pub fn next_packet(&mut self) -> Result<Option<RawPacket>, Error> {
        let cursor = Cursor {
            frame_number: &mut self.frame_number,
            link_type: &mut self.link_type,
        };
        match &mut self.inner {
            ReaderInner::Legacy { reader, precision } => next_legacy(reader, *precision, cursor),
            ReaderInner::Ng { reader, interfaces } => next_ng(reader, interfaces, cursor),
        }
    }
}

/// Reader position shared by both formats.
struct Cursor<'a> {
    frame_number: &'a mut u64,
    link_type: &'a mut u16,
}

type BoxedRead = BufReader<Box<dyn Read + Send>>;

fn next_legacy(
    reader: &mut LegacyPcapReader<BoxedRead>,
    precision: TimePrecision,
    cursor: Cursor<'_>,
) -> Result<Option<RawPacket>, Error> {
    loop {
        match reader.next() {
            Ok((offset, block)) => match block {
                PcapBlockOwned::Legacy(packet) => {
                    *cursor.frame_number += 1;

                    let fraction_ns = match precision {
                        TimePrecision::Micro => packet.ts_usec as i64 * 1_000,
                        TimePrecision::Nano => packet.ts_usec as i64,
                    };
                    let timestamp_ns = packet.ts_sec as i64 * 1_000_000_000 + fraction_ns;

                    let raw = RawPacket::new(
                        *cursor.frame_number,
                        timestamp_ns,
                        packet.caplen,
                        packet.origlen,
                        *cursor.link_type,
                        packet.data.to_vec(),
                    );

                    reader.consume(offset);
                    return Ok(Some(raw));
                }
                PcapBlockOwned::LegacyHeader(header) => {
                    *cursor.link_type = header.network.0 as u16;
                    reader.consume(offset);
                }
                _ => reader.consume(offset),
            },
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::Incomplete(_)) => {
                reader.refill().map_err(|e| {
                    Error::Pcap(OurPcapError::InvalidFormat {
                        reason: format!("Refill error: {e}"),
                    })
                })?;
            }
            Err(e) => {
                return Err(Error::Pcap(OurPcapError::InvalidFormat {
                    reason: format!("Parse error: {e}"),
                }))
            }
        }
    }
}

fn next_ng(
    reader: &mut PcapNGReader<BoxedRead>,
    interfaces: &mut Vec<Interface>,
    cursor: Cursor<'_>,
) -> Result<Option<RawPacket>, Error> {
    loop {
        match reader.next() {
            Ok((offset, block)) => {
                use pcap_parser::pcapng::Block;

                match block {
                    PcapBlockOwned::NG(Block::SectionHeader(_)) => {
                        // Interface ids are scoped to their section
                        interfaces.clear();
                        reader.consume(offset);
                    }
                    PcapBlockOwned::NG(Block::InterfaceDescription(idb)) => {
                        let units_per_sec = idb.ts_resolution().ok_or_else(|| {
                            Error::Pcap(OurPcapError::InvalidFormat {
                                reason: format!(
                                    "Unsupported timestamp resolution on interface {}",
                                    interfaces.len()
                                ),
                            })
                        })?;
                        let interface = Interface {
                            link_type: idb.linktype.0 as u16,
                            units_per_sec,
                            offset_secs: idb.ts_offset() as i64,
                        };
                        if interfaces.is_empty() {
                            *cursor.link_type = interface.link_type;
                        }
                        interfaces.push(interface);
                        reader.consume(offset);
                    }
                    PcapBlockOwned::NG(Block::EnhancedPacket(epb)) => {
                        let interface = lookup_interface(interfaces, epb.if_id)?;
                        *cursor.frame_number += 1;

                        let raw = RawPacket::new(
                            *cursor.frame_number,
                            interface.timestamp_ns(epb.ts_high, epb.ts_low),
                            epb.caplen,
                            epb.origlen,
                            interface.link_type,
                            epb.data.to_vec(),
                        );

                        reader.consume(offset);
                        return Ok(Some(raw));
                    }
                    PcapBlockOwned::NG(Block::SimplePacket(spb)) => {
                        // Simple packets always belong to the first interface
                        let interface = lookup_interface(interfaces, 0)?;
                        *cursor.frame_number += 1;

                        let raw = RawPacket::new(
                            *cursor.frame_number,
                            0, // No timestamp in simple packets
                            spb.data.len() as u32,
                            spb.origlen,
                            interface.link_type,
                            spb.data.to_vec(),
                        );

                        reader.consume(offset);
                        return Ok(Some(raw));
                    }
                    _ => reader.consume(offset),
                }
            }
            Err(PcapError::Eof) => return Ok(None),
            Err(PcapError::Incomplete(_)) => {
                reader.refill().map_err(|e| {
                    Error::Pcap(OurPcapError::InvalidFormat {
                        reason: format!("Refill error: {e}"),
                    })
                })?;
            }
            Err(e) => {
                return Err(Error::Pcap(OurPcapError::InvalidFormat {
                    reason: format!("Parse error: {e}"),
                }))
            }
        }
    }
}

fn lookup_interface(interfaces: &[Interface], if_id: u32) -> Result<Interface, Error> {
    interfaces.get(if_id as usize).copied().ok_or_else(|| {
        Error::Pcap(OurPcapError::InvalidFormat {
            reason: format!("Packet references undeclared interface {if_id}"),
        })
    })
}

fn open_file(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|_| {
        Error::Pcap(OurPcapError::FileNotFound {
            path: path.display().to_string(),
        })
    })
}

/// Detect compression by extension first, then by magic bytes.
fn detect_compression(path: &Path) -> Result<Compression, Error> {
    if is_gzip_extension(path) {
        return Ok(Compression::Gzip);
    }

    let mut file = open_file(path)?;
    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        match file.read(&mut header[filled..])? {
            0 => break,
            n => filled += n,
        }
    }

    Ok(Compression::detect(&header[..filled]))
}

/// Check if a path appears to be a gzip file by extension only.
pub fn is_gzip_extension<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .file_name()
        .and_then(|f| f.to_str())
        .map(|name| name.to_lowercase().ends_with(".gz"))
        .unwrap_or(false)
}

/// Iterator adapter for PcapReader.
impl Iterator for PcapReader {
    type Item = Result<RawPacket, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_packet() {
            Ok(Some(packet)) => Some(Ok(packet)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
