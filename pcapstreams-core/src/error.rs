//! Error types for pcapstreams-core.
//!
//! This module provides structured error types for all engine operations:
//!
//! - [`enum@Error`] - Main error enum for capture reading
//! - [`PcapError`] - Errors from PCAP file reading
//! - [`QueryError`] - Errors from conversation lookups
//! - [`IngestError`] - A capture whose ingestion stopped part way through
//!
//! All errors implement `std::error::Error` and can be converted to `anyhow::Error`.

use thiserror::Error;

/// Main error type for pcapstreams-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Error reading or parsing PCAP file
    #[error("PCAP error: {0}")]
    Pcap(#[from] PcapError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to PCAP file reading.
#[derive(Error, Debug)]
pub enum PcapError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Invalid PCAP format
    #[error("Invalid PCAP format: {reason}")]
    InvalidFormat { reason: String },
}

/// Errors returned by the query layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The conversation key was never appended to the index
    #[error("Stream not found: {key}")]
    StreamNotFound { key: String },
}

/// Ingestion of a capture stopped before the end of the file.
///
/// Frames appended before the failure stay in the index.
#[derive(Error, Debug)]
#[error("ingestion stopped after {ingested} frames: {source}")]
pub struct IngestError {
    /// Number of frames appended before the failure
    pub ingested: u64,

    /// Underlying read error
    #[source]
    pub source: Error,
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
