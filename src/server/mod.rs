//! HTTP front door: `POST /upload`, `POST /predict`, `GET /health`.

mod error;
pub mod handlers;
mod state;

pub use error::{ApiError, ErrorBody};
pub use handlers::{HealthResponse, UploadResponse};
pub use state::AppState;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub address: SocketAddr,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([127, 0, 0, 1], 5000)),
            max_body_size: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn with_address(mut self, address: SocketAddr) -> Self {
        self.address = address;
        self
    }

    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }
}

pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/upload", post(handlers::upload_data))
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health_check))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .with_state(state)
}

/// Serves on an already bound listener until Ctrl-C.
pub async fn serve(listener: TcpListener, config: &ServerConfig, state: AppState) -> std::io::Result<()> {
    info!(address = %listener.local_addr()?, max_body_size = config.max_body_size, "listening");
    axum::serve(listener, router(state, config))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C, serving until killed");
            std::future::pending::<()>().await
        }
    }
}
