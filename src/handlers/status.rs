//! Health check handler for the webhook server.
//!
//! - `/health` - liveness check for systemd/load balancers, with uptime
//!
//! # Example Response
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "name": "messenger-webhook",
//!   "version": "0.1.0",
//!   "uptime_seconds": 3600,
//!   "timestamp": "2024-01-01T00:00:00+00:00"
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Server version from Cargo.toml
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name from Cargo.toml
pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status (always "healthy" if responding)
    pub status: String,

    /// Server name
    pub name: String,

    /// Server version
    pub version: String,

    /// Seconds since the server started
    pub uptime_seconds: u64,

    /// RFC 3339 timestamp of when the response was generated
    pub timestamp: String,
}

/// State shared by the health route.
#[derive(Debug)]
pub struct HealthState {
    start_time: Instant,
}

impl HealthState {
    /// Start the uptime clock now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Seconds elapsed since creation.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check endpoint handler.
pub async fn health_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    debug!("Health check requested");

    let response = HealthResponse {
        status: "healthy".to_string(),
        name: SERVER_NAME.to_string(),
        version: SERVER_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(response))
}

/// Router serving `GET /health`.
pub fn health_router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}
