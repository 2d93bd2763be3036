// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use crate::application::data_source::DataSource;
use crate::application::pipeline::{PipelineOrchestrator, PipelineSettings};
use crate::application::session::SessionStore;
use crate::application::view_state::ViewState;
use crate::application::viewer_service::ViewerService;
use crate::application::worker::{BackgroundWorker, ComputeChannel, ComputeDispatcher};
use crate::infrastructure::config::load_viewer_config;
use crate::infrastructure::file_source::FileDataSource;
use crate::infrastructure::http_source::HttpDataSource;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing - RUST_LOG takes precedence, fallback to info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_viewer_config()?;

    // Background worker, with inline computation as the fallback
    let dispatcher = if config.pipeline.use_worker {
        match BackgroundWorker::spawn() {
            Ok(worker) => {
                let worker: Arc<dyn ComputeChannel> = Arc::new(worker);
                ComputeDispatcher::new(Some(worker), config.pipeline.worker_threshold)
            }
            Err(e) => {
                tracing::warn!("Background worker unavailable, computing inline: {}", e);
                ComputeDispatcher::inline_only()
            }
        }
    } else {
        ComputeDispatcher::inline_only()
    };

    // Create services (application layer)
    let display = &config.display;
    let session = Arc::new(SessionStore::new(ViewState::new(
        display.unit,
        display.runtime_granularity,
        display.correlation_granularity,
        display.hot_threshold(),
    )));
    let settings = PipelineSettings {
        chunk_size: config.pipeline.chunk_size,
        chart_yield: config.pipeline.chart_yield(),
    };
    let pipeline = PipelineOrchestrator::new(dispatcher, settings, session);

    let sample: Arc<dyn DataSource> = match &config.assets.sample_url {
        Some(url) => Arc::new(HttpDataSource::new(url.clone())),
        None => Arc::new(FileDataSource::new(&config.assets.sample_path)),
    };
    let viewer_service = ViewerService::new(pipeline, sample, config.pipeline.debounce());

    // Create application state
    let state = Arc::new(AppState {
        viewer_service,
        static_root: PathBuf::from(&config.assets.static_dir),
    });

    // Build router (presentation layer)
    // Compression is handled per response, so no CompressionLayer here
    let router = build_router(state, config.server.max_upload_mb * 1024 * 1024);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Starting hvac-telemetry-viewer on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down gracefully");
}
