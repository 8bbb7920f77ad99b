//! HTTP error mapping.
//!
//! Every API failure is answered with a plain-text body and one of the
//! status codes below.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error};

use pcapstreams_core::QueryError;

/// Errors returned by API handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Conversation key never seen
    #[error("Stream not found")]
    StreamNotFound { key: String },

    /// Upload exceeded the request size limit
    #[error("File size too large")]
    FileTooLarge,

    /// Upload was not a multipart form carrying a `pcap` file
    #[error("Failed to retrieve file")]
    MissingFile,

    /// Upload destination could not be created
    #[error("Failed to save file")]
    SaveFailed(#[source] std::io::Error),

    /// Upload body could not be written to disk
    #[error("Failed to write file")]
    WriteFailed(#[source] std::io::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::StreamNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::FileTooLarge | ApiError::MissingFile => StatusCode::BAD_REQUEST,
            ApiError::SaveFailed(_) | ApiError::WriteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::StreamNotFound { key } => ApiError::StreamNotFound { key },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::SaveFailed(e) | ApiError::WriteFailed(e) => {
                error!(error = %e, "{}", self);
            }
            ApiError::StreamNotFound { key } => debug!(%key, "{}", self),
            _ => debug!("{}", self),
        }
        (status, self.to_string()).into_response()
    }
}
