//! Ingestion driver.
//!
//! Reads a capture front to back, numbering frames 1, 2, 3, ... and filing
//! each normalized record into the shared [`ConversationIndex`]. A file is
//! always ingested on a single thread; several files may be ingested
//! concurrently into the same index.

mod status;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::IngestError;
use crate::io::PacketReader;
use crate::pcap::PcapReader;
use crate::record::RecordNormalizer;
use crate::stream::ConversationIndex;

pub use status::{UploadState, UploadStatus, UploadTracker};

/// Ingest every frame `reader` yields.
///
/// Returns the number of frames appended. On a read error the frames
/// appended so far stay in the index and the count is carried in the error.
pub fn ingest_reader<R: PacketReader + ?Sized>(
    reader: &mut R,
    index: &ConversationIndex,
    normalizer: &RecordNormalizer,
) -> Result<u64, IngestError> {
    let mut ingested = 0u64;
    let mut truncated = 0u64;

    loop {
        let packet = match reader.next_packet() {
            Ok(Some(packet)) => packet,
            Ok(None) => break,
            Err(source) => return Err(IngestError { ingested, source }),
        };

        if packet.is_truncated() {
            truncated += 1;
        }

        ingested += 1;
        index.append(normalizer.normalize(ingested, &packet));
    }

    if truncated > 0 {
        debug!(truncated, "frames shorter than their original length");
    }

    Ok(ingested)
}

/// Open the capture at `path` and ingest it.
///
/// A file that cannot be opened fails with `ingested == 0`.
pub fn ingest_file<P: AsRef<Path>>(
    path: P,
    index: &ConversationIndex,
    normalizer: &RecordNormalizer,
) -> Result<u64, IngestError> {
    let path = path.as_ref();
    info!(path = %path.display(), "ingesting capture");

    let result = PcapReader::open(path)
        .map_err(|source| IngestError {
            ingested: 0,
            source,
        })
        .and_then(|mut reader| {
            debug!(link_type = reader.link_type(), "capture opened");
            ingest_reader(&mut reader, index, normalizer)
        });

    match &result {
        Ok(frames) => info!(path = %path.display(), frames, "capture ingested"),
        Err(e) => warn!(
            path = %path.display(),
            frames = e.ingested,
            error = %e.source,
            "capture ingestion stopped"
        ),
    }

    result
}
