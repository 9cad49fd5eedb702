//! rollcall server entry point.
//!
//! Restores the last used class, starts the background writer and the OCR
//! worker, and serves the REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use rollcall::api;
use rollcall::app_state::AppState;
use rollcall::config::{LogFormat, PickerConfig};
use rollcall::domain::{EventBus, StateStore};
use rollcall::ocr::{CommandExtractor, OcrClient};
use rollcall::persistence::{FileStore, PersistenceWriter};
use rollcall::service::PickerService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = PickerConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(
        addr = %config.listen_addr,
        data_dir = %config.data_dir.display(),
        "starting rollcall"
    );

    // Restore state
    let files = FileStore::new(&config.data_dir);
    let initial = PickerService::restore(&files, &config.default_class_id).await;
    let store = Arc::new(StateStore::new(initial.clone()));
    let writer = PersistenceWriter::spawn(&store, files.clone(), Some(initial));

    // Text recognition
    let ocr = config.ocr_enabled.then(|| {
        OcrClient::spawn(
            CommandExtractor::new(&config.ocr_command, config.ocr_args.clone()),
            config.ocr_timeout(),
        )
    });
    if ocr.is_none() {
        tracing::info!("text recognition disabled");
    }

    // Build application state and router
    let event_bus = EventBus::new(config.event_bus_capacity);
    let app_state = AppState::new(Arc::clone(&store), files, ocr, event_bus);
    let app = api::build_app(
        app_state,
        config.request_timeout(),
        config.max_upload_bytes,
    );

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Flush pending saves
    writer.shutdown(&store).await;
    tracing::info!("rollcall stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
