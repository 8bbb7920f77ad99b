//! Capture upload.

use std::path::Path;

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use pcapstreams_core::ingest_file;

use super::AppState;
use crate::error::ApiError;

/// Multipart field carrying the capture.
const UPLOAD_FIELD: &str = "pcap";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub upload_id: u64,
}

/// Reduce a client-supplied filename to its final path component.
///
/// Returns `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    // Clients on Windows send backslash-separated paths
    let last = name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or_default();
    Path::new(last)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

fn from_multipart(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::FileTooLarge
    } else {
        ApiError::MissingFile
    }
}

async fn write_field(field: &mut Field<'_>, path: &Path) -> Result<u64, ApiError> {
    let mut file = File::create(path).await.map_err(ApiError::SaveFailed)?;
    let mut written = 0u64;

    while let Some(chunk) = field.chunk().await.map_err(from_multipart)? {
        file.write_all(&chunk).await.map_err(ApiError::WriteFailed)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(ApiError::WriteFailed)?;

    Ok(written)
}

/// Store the uploaded capture and start ingesting it.
///
/// The response is sent as soon as the file is on disk; ingestion runs on
/// the blocking pool and reports through the upload tracker only.
pub(super) async fn upload_pcap(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::MissingFile)?;
    // Advance to the `pcap` field, skipping any others. Done inline rather
    // than in a helper returning `Field<'_>`: the borrow checker rejects
    // conditionally returning a loop-scoped borrow from a function.
    let mut field = loop {
        match multipart.next_field().await.map_err(from_multipart)? {
            Some(field) if field.name() == Some(UPLOAD_FIELD) => break field,
            Some(_) => continue,
            None => return Err(ApiError::MissingFile),
        }
    };

    let filename = field
        .file_name()
        .and_then(sanitize_filename)
        .ok_or(ApiError::MissingFile)?;

    fs::create_dir_all(state.upload_dir.as_path())
        .await
        .map_err(ApiError::SaveFailed)?;
    let path = state.upload_dir.join(&filename);

    let bytes = match write_field(&mut field, &path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            // Don't leave a partial capture behind
            let _ = fs::remove_file(&path).await;
            return Err(e);
        }
    };

    let upload_id = state.uploads.register(filename.clone());
    info!(upload_id, %filename, bytes, "capture uploaded");

    let AppState {
        index,
        uploads,
        normalizer,
        ..
    } = state;
    tokio::task::spawn_blocking(move || {
        let outcome = ingest_file(&path, &index, &normalizer);
        if let Err(e) = &outcome {
            warn!(upload_id, error = %e, "upload ingestion failed");
        }
        uploads.finish(upload_id, &outcome);
    });

    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        filename,
        upload_id,
    }))
}
