//! # pcapstreams-core
//!
//! Packet ingestion and conversation reconstruction engine.
//!
//! Capture files are decoded frame by frame into normalized
//! [`PacketRecord`]s, which are filed into a shared [`ConversationIndex`]
//! under both directions of their address/port pair. The index is then
//! queried page by page.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pcapstreams_core::prelude::*;
//!
//! let index = ConversationIndex::new();
//! let normalizer = RecordNormalizer::default();
//!
//! let frames = ingest_file("capture.pcap", &index, &normalizer)?;
//! println!("{frames} frames, {} conversations", index.key_count() / 2);
//!
//! for key in list_streams(&index) {
//!     let page = fetch_stream(&index, key.as_str(), PageRequest::default())?;
//!     println!("{key}: {} pages", page.total_pages);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                        pcapstreams-core                             |
//! +---------------------------------------------------------------------+
//! |  pcap/      - PCAP/PCAPNG reading, compression                      |
//! |  io/        - PacketReader trait                                    |
//! |  protocol/  - Protocol trait, layer decoders, DecodedFrame          |
//! |  format/    - Address and timestamp text                            |
//! |  record/    - PacketRecord, normalization, classification           |
//! |  stream/    - ConversationKey, ConversationIndex                    |
//! |  query/     - Pagination over one or all conversations              |
//! |  ingest/    - Ingestion driver, upload status tracking              |
//! |  error/     - Error types                                           |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Crate Features
//!
//! - `compress-zstd` - Zstd decompression of capture files (gzip is always on)

pub mod error;
pub mod format;
pub mod ingest;
pub mod io;
pub mod pcap;
pub mod protocol;
pub mod query;
pub mod record;
pub mod stream;

pub use error::{Error, IngestError, PcapError, QueryError, Result};
pub use ingest::{ingest_file, ingest_reader, UploadState, UploadStatus, UploadTracker};
pub use io::PacketReader;
pub use pcap::{PcapReader, RawPacket};
pub use protocol::{default_registry, parse_packet, DecodedFrame, Layer, ProtocolRegistry};
pub use query::{fetch_all, fetch_stream, list_streams, PacketPage, PageRequest, DEFAULT_PAGE_LIMIT};
pub use record::{Classification, PacketRecord, RecordNormalizer};
pub use stream::{ConversationIndex, ConversationKey};

/// Commonly used types for building on the engine.
pub mod prelude {
    pub use crate::error::{Error, IngestError, QueryError};
    pub use crate::ingest::{ingest_file, UploadTracker};
    pub use crate::query::{fetch_all, fetch_stream, list_streams, PacketPage, PageRequest};
    pub use crate::record::{PacketRecord, RecordNormalizer};
    pub use crate::stream::{ConversationIndex, ConversationKey};
}
