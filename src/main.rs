//! pcapstreams server entry point.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pcapstreams::cli::Args;
use pcapstreams::server::{router, AppState, ServerConfig};
use pcapstreams_core::ingest_file;

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_filter().into()),
        )
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(args.worker_threads())
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run(args))
}

async fn run(args: Args) -> Result<()> {
    let allowed_origin = HeaderValue::from_str(&args.allowed_origin)
        .with_context(|| format!("Invalid allowed origin: {}", args.allowed_origin))?;

    let config = ServerConfig {
        upload_dir: args.upload_dir.clone(),
        max_upload_size: args.max_upload_size,
        allowed_origin,
    };
    let state = AppState::new(config.upload_dir.clone());

    preload(&state, &args).await?;

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("Failed to bind {}", args.listen))?;
    info!(addr = %args.listen, workers = args.worker_threads(), "server running");

    axum::serve(listener, router(state, &config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")
}

/// Ingest the captures named on the command line, one after another.
///
/// A capture that fails is logged and skipped.
async fn preload(state: &AppState, args: &Args) -> Result<()> {
    for path in &args.files {
        let filename = path.display().to_string();
        let upload_id = state.uploads.register(filename.clone());

        let index = state.index.clone();
        let normalizer = state.normalizer.clone();
        let task_path = path.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            ingest_file(&task_path, &index, &normalizer)
        })
        .await
        .with_context(|| format!("Ingestion task for {filename} panicked"))?;

        if let Err(e) = &outcome {
            warn!(upload_id, file = %filename, error = %e, "skipping capture");
        }
        state.uploads.finish(upload_id, &outcome);
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
