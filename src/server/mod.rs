//! HTTP API.
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | GET | `/streams` | all conversation keys |
//! | GET | `/stream/{key}` | one page of a conversation |
//! | GET | `/stream/`, `/packets` | one page over every record |
//! | GET | `/uploads` | ingestion status of every upload |
//! | POST | `/upload-pcap` | store a capture and ingest it in the background |

mod handlers;
mod upload;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use pcapstreams_core::{ConversationIndex, RecordNormalizer, UploadTracker};

pub use handlers::PageParams;
pub use upload::{sanitize_filename, UploadResponse};

/// Settings that shape the router.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub upload_dir: PathBuf,
    pub max_upload_size: usize,
    pub allowed_origin: HeaderValue,
}

/// State shared by every handler and ingestion task.
#[derive(Debug, Clone)]
pub struct AppState {
    pub index: Arc<ConversationIndex>,
    pub uploads: Arc<UploadTracker>,
    pub normalizer: Arc<RecordNormalizer>,
    pub upload_dir: Arc<PathBuf>,
}

impl AppState {
    /// Fresh state with an empty index.
    pub fn new(upload_dir: PathBuf) -> Self {
        Self {
            index: Arc::new(ConversationIndex::new()),
            uploads: Arc::new(UploadTracker::new()),
            normalizer: Arc::new(RecordNormalizer::default()),
            upload_dir: Arc::new(upload_dir),
        }
    }
}

/// Build the API router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    // Requests from any other origin get no CORS headers at all
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([config.allowed_origin.clone()]))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/streams", get(handlers::list_streams))
        .route("/stream/", get(handlers::all_packets))
        .route("/stream/:key", get(handlers::get_stream))
        .route("/packets", get(handlers::all_packets))
        .route("/uploads", get(handlers::list_uploads))
        .route("/upload-pcap", post(upload::upload_pcap))
        .layer(DefaultBodyLimit::max(config.max_upload_size))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
