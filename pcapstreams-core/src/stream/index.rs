//! Concurrent conversation index.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use super::ConversationKey;
use crate::record::PacketRecord;

/// Map from conversation key to the records filed under it, in append order.
///
/// Every record is filed under its forward and its reverse key. A single
/// exclusive lock guards the map, so readers never see a record under only
/// one of its two keys. Entries are never removed.
#[derive(Debug, Default)]
pub struct ConversationIndex {
    streams: Mutex<HashMap<ConversationKey, Vec<Arc<PacketRecord>>>>,
}

impl ConversationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// File `record` under its forward and reverse keys.
    ///
    /// When both keys are textually identical the record is filed twice
    /// under that one key.
    pub fn append(&self, record: PacketRecord) -> Arc<PacketRecord> {
        let record = Arc::new(record);
        let forward = ConversationKey::forward(&record);
        let reverse = ConversationKey::reverse(&record);

        let mut streams = self.streams.lock();
        trace!(index = record.index, key = %forward, "appending record");
        streams
            .entry(forward)
            .or_default()
            .push(Arc::clone(&record));
        streams
            .entry(reverse)
            .or_default()
            .push(Arc::clone(&record));

        record
    }

    /// All known keys, in no particular order.
    pub fn keys(&self) -> Vec<ConversationKey> {
        self.streams.lock().keys().cloned().collect()
    }

    /// Records filed under `key`, or `None` if nothing was ever appended to it.
    pub fn get(&self, key: &str) -> Option<Vec<Arc<PacketRecord>>> {
        self.streams.lock().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.streams.lock().contains_key(key)
    }

    /// Every record under every key.
    ///
    /// A record appears once per key it is filed under, so each packet is
    /// normally returned twice. No deduplication is done.
    pub fn all_records(&self) -> Vec<Arc<PacketRecord>> {
        let streams = self.streams.lock();
        let total = streams.values().map(Vec::len).sum();
        let mut records = Vec::with_capacity(total);
        for sequence in streams.values() {
            records.extend(sequence.iter().cloned());
        }
        records
    }

    /// Number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.streams.lock().len()
    }

    /// Total number of filed entries across all keys (twice the record count).
    pub fn entry_count(&self) -> usize {
        self.streams.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.lock().is_empty()
    }
}
