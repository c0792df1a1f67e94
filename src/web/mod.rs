//! HTTP surface: note lookup, creation and text updates.

pub mod error;
mod handlers;
pub mod templates;

pub use error::WebError;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, put};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::blob::BlobStore;
use crate::config::Config;
use crate::error::Result;
use crate::store::NoteStore;

pub const MAX_UPLOAD_MB: usize = 15;
pub const MAX_UPLOAD_BYTES: usize = MAX_UPLOAD_MB * 1024 * 1024;

/// Shared handler state. Both stores are safe for concurrent use.
#[derive(Clone)]
pub struct AppState {
    pub notes: Arc<dyn NoteStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(notes: Arc<dyn NoteStore>, blobs: Arc<dyn BlobStore>, static_dir: PathBuf) -> Self {
        Self {
            notes,
            blobs,
            static_dir,
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/", get(handlers::home))
        .route(
            "/note/{id}",
            get(handlers::show_note).post(handlers::create_note),
        )
        .route("/note/{id}/text", put(handlers::update_text))
        .nest_service("/static", static_files)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Open the configured stores and serve until Ctrl-C.
pub async fn serve(config: Config) -> Result<()> {
    let notes = crate::store::open(&config).await?;
    let blobs = crate::blob::open(&config)?;
    let app = router(AppState::new(notes, blobs, config.static_dir.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "starting physlink server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
