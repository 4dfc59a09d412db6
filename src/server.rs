//! HTTP server assembly
//!
//! Builds the application router (webhook + health) and runs it until a
//! shutdown signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::Result;
use crate::handlers::{health_router, HealthState};
use crate::messenger::{
    webhook_router, EchoHandler, EventHandler, MessengerConfig, SendApiClient, WebhookState,
};

/// Default listening port
pub const DEFAULT_PORT: u16 = 8081;

/// Build the full application router around `handler`
pub fn app<H: EventHandler>(config: Arc<MessengerConfig>, handler: Arc<H>) -> Router {
    let state = Arc::new(WebhookState::new(config, handler));

    Router::new()
        .merge(webhook_router(state))
        .merge(health_router(Arc::new(HealthState::new())))
        .layer(TraceLayer::new_for_http())
}

/// Build the echo bot router
pub fn echo_app(config: Arc<MessengerConfig>) -> Result<Router> {
    let handler = Arc::new(EchoHandler::new(SendApiClient::new(&config)?));
    Ok(app(config, handler))
}

/// Bind `addr` and serve `router` until Ctrl-C or SIGTERM
pub async fn serve(addr: SocketAddr, router: Router) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Webhook server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Webhook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
