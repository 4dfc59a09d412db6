//! Webhook endpoint
//!
//! ```text
//! GET  /webhook -> handshake check -> 200 challenge | 403
//! POST /webhook -> decode -> object == "page"? -> dispatch -> 200
//!                    |              |
//!                    v              v
//!             200 (no-op)          404
//! HEAD and any other method on /webhook -> 403 "No way"
//! ```

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::{info, warn};

use crate::messenger::config::MessengerConfig;
use crate::messenger::dispatcher::EventDispatcher;
use crate::messenger::error::WebhookRejection;
use crate::messenger::events::Callback;
use crate::messenger::handler::EventHandler;

/// Path the webhook is served on
pub const WEBHOOK_PATH: &str = "/webhook";

/// Mode value sent by the platform when subscribing
pub const SUBSCRIBE_MODE: &str = "subscribe";

/// Shared state for the webhook routes
pub struct WebhookState<H: EventHandler> {
    /// Immutable configuration
    pub config: Arc<MessengerConfig>,
    /// Event dispatcher
    pub dispatcher: EventDispatcher<H>,
}

impl<H: EventHandler> WebhookState<H> {
    /// Create state from a configuration and a handler
    pub fn new(config: Arc<MessengerConfig>, handler: Arc<H>) -> Self {
        Self {
            config,
            dispatcher: EventDispatcher::new(handler),
        }
    }
}

/// Query parameters of the verification handshake
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    /// Should be "subscribe"
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    /// Token configured on the platform side
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    /// Value to echo back
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

impl VerifyQuery {
    /// Build from raw query pairs, keeping the first value of each key
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "hub.mode" => &mut query.mode,
                "hub.verify_token" => &mut query.verify_token,
                "hub.challenge" => &mut query.challenge,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }

    /// Challenge to answer with, if mode and token check out
    pub fn verify(&self, config: &MessengerConfig) -> Option<&str> {
        let mode = self.mode.as_deref().unwrap_or_default();
        let token = self.verify_token.as_deref().unwrap_or_default();

        if mode != SUBSCRIBE_MODE || !config.verify_token_matches(token) {
            return None;
        }
        Some(self.challenge.as_deref().unwrap_or_default())
    }
}

/// Router serving the webhook on [`WEBHOOK_PATH`]
pub fn webhook_router<H: EventHandler>(state: Arc<WebhookState<H>>) -> Router {
    Router::new()
        .route(
            WEBHOOK_PATH,
            get(verify_handler::<H>)
                .head(method_not_allowed)
                .post(receive_handler::<H>)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

/// Verification handshake (GET)
pub async fn verify_handler<H: EventHandler>(
    State(state): State<Arc<WebhookState<H>>>,
    pairs: Option<Query<Vec<(String, String)>>>,
) -> Response {
    let query = pairs
        .map(|Query(pairs)| VerifyQuery::from_pairs(pairs))
        .unwrap_or_default();

    match query.verify(&state.config) {
        Some(challenge) => {
            info!("Verification OK");
            (StatusCode::OK, challenge.to_string()).into_response()
        }
        None => {
            warn!(mode = ?query.mode, "Verification failed");
            WebhookRejection::Forbidden.into_response()
        }
    }
}

/// Event delivery (POST)
pub async fn receive_handler<H: EventHandler>(
    State(state): State<Arc<WebhookState<H>>>,
    body: Bytes,
) -> Response {
    let callback = match Callback::from_bytes(&body) {
        Ok(callback) => callback,
        Err(e) => {
            warn!(error = %e, len = body.len(), "Ignoring undecodable callback");
            return StatusCode::OK.into_response();
        }
    };

    if !callback.is_page() {
        warn!(object = %callback.object, "Rejecting non-page callback");
        return WebhookRejection::NotPage.into_response();
    }

    let summary = state.dispatcher.dispatch(&callback).await;
    info!(
        entries = callback.entry.len(),
        items = callback.messaging().count(),
        handled = summary.handled(),
        messages = summary.messages,
        postbacks = summary.postbacks,
        skipped = summary.skipped,
        failed = summary.failed,
        "Callback processed"
    );

    StatusCode::OK.into_response()
}

async fn method_not_allowed() -> WebhookRejection {
    WebhookRejection::MethodNotAllowed
}
