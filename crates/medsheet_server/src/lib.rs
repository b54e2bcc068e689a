//! `medsheet_server` v1:
//! Upload service and command line for referring-doctor consolidation.
//!
//! - `cli`      : `clap` argument models and the offline `convert` command
//! - `handlers` : `axum` request handlers
pub mod cli;
mod handlers;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use medsheet_io_xlsx::SpecConvertOptions;
use tower_http::trace::TraceLayer;

pub use handlers::*;

/// Default request body limit in MiB.
pub const N_MAX_UPLOAD_MB_DEFAULT: usize = 32;

/// State shared across handlers; read-only after startup.
#[derive(Clone)]
pub struct ServerState {
    /// Conversion options applied to every upload.
    pub options: Arc<SpecConvertOptions>,
    /// Request body limit in bytes.
    pub n_max_upload_bytes: usize,
}

impl ServerState {
    /// Create state from conversion options and an upload limit in MiB.
    #[must_use]
    pub fn new(options: SpecConvertOptions, n_max_upload_mb: usize) -> Self {
        Self {
            options: Arc::new(options),
            n_max_upload_bytes: n_max_upload_mb.saturating_mul(1024 * 1024),
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(SpecConvertOptions::default(), N_MAX_UPLOAD_MB_DEFAULT)
    }
}

/// Build the router with all endpoints.
pub fn build_router(state: ServerState) -> Router {
    let n_max_upload_bytes = state.n_max_upload_bytes;
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(n_max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already-bound listener.
pub async fn serve(
    listener: tokio::net::TcpListener,
    state: ServerState,
) -> Result<(), std::io::Error> {
    axum::serve(listener, build_router(state)).await
}

/// Bind `addr` and serve until the process exits.
pub async fn start_server(addr: &str, state: ServerState) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    serve(listener, state).await
}
