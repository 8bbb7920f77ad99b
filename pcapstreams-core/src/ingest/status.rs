//! Per-upload ingestion status.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::Serialize;

use crate::error::IngestError;

/// Where an ingestion run stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadState {
    Pending,
    Done { packets: u64 },
    Failed { packets: u64, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadStatus {
    pub id: u64,
    pub filename: String,
    #[serde(flatten)]
    pub state: UploadState,
}

#[derive(Debug, Default)]
struct TrackerInner {
    next_id: u64,
    uploads: BTreeMap<u64, UploadStatus>,
}

/// Registry of ingestion runs, keyed by a process-unique id starting at 1.
#[derive(Debug, Default)]
pub struct UploadTracker {
    inner: Mutex<TrackerInner>,
}

impl UploadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending run and return its id.
    pub fn register(&self, filename: impl Into<String>) -> u64 {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.uploads.insert(
            id,
            UploadStatus {
                id,
                filename: filename.into(),
                state: UploadState::Pending,
            },
        );
        id
    }

    /// Record the outcome of run `id`. Unknown ids are ignored.
    pub fn finish(&self, id: u64, outcome: &Result<u64, IngestError>) {
        let state = match outcome {
            Ok(packets) => UploadState::Done { packets: *packets },
            Err(e) => UploadState::Failed {
                packets: e.ingested,
                error: e.source.to_string(),
            },
        };

        if let Some(status) = self.inner.lock().uploads.get_mut(&id) {
            status.state = state;
        }
    }

    pub fn get(&self, id: u64) -> Option<UploadStatus> {
        self.inner.lock().uploads.get(&id).cloned()
    }

    /// Every run, ascending by id.
    pub fn list(&self) -> Vec<UploadStatus> {
        self.inner.lock().uploads.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PcapError;

    #[test]
    fn test_register_and_finish() {
        let tracker = UploadTracker::new();
        let a = tracker.register("a.pcap");
        let b = tracker.register("b.pcap");
        assert_eq!((a, b), (1, 2));
        assert_eq!(tracker.get(a).map(|s| s.state), Some(UploadState::Pending));

        tracker.finish(a, &Ok(42));
        tracker.finish(
            b,
            &Err(IngestError {
                ingested: 3,
                source: PcapError::InvalidFormat {
                    reason: "bad record".to_string(),
                }
                .into(),
            }),
        );

        let statuses = tracker.list();
        assert_eq!(statuses[0].state, UploadState::Done { packets: 42 });
        match &statuses[1].state {
            UploadState::Failed { packets, error } => {
                assert_eq!(*packets, 3);
                assert!(error.contains("bad record"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn test_finish_unknown_id_is_ignored() {
        let tracker = UploadTracker::new();
        tracker.finish(9, &Ok(1));
        assert!(tracker.list().is_empty());
    }

    #[test]
    fn test_status_json_shape() {
        let status = UploadStatus {
            id: 1,
            filename: "x.pcap".to_string(),
            state: UploadState::Done { packets: 5 },
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "filename": "x.pcap", "state": "done", "packets": 5})
        );

        let pending = UploadStatus {
            id: 2,
            filename: "y.pcap".to_string(),
            state: UploadState::Pending,
        };
        assert_eq!(serde_json::to_value(&pending).unwrap()["state"], "pending");
    }
}
