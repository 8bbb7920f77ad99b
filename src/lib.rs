//! pcapstreams - browse conversations reconstructed from PCAP captures.
//!
//! This crate wraps the `pcapstreams-core` engine in an HTTP API. Captures
//! are uploaded (or given on the command line), ingested in the
//! background, and their conversations are served page by page as JSON.
//!
//! # Example
//!
//! ```no_run
//! use axum::http::HeaderValue;
//! use pcapstreams::server::{router, AppState, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig {
//!         upload_dir: "./uploads".into(),
//!         max_upload_size: 50 * 1024 * 1024,
//!         allowed_origin: HeaderValue::from_static("http://localhost:3000"),
//!     };
//!     let app = router(AppState::new(config.upload_dir.clone()), &config);
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod server;

pub use error::ApiError;
