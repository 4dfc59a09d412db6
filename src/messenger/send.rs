//! Send API client
//!
//! Delivers replies through the Messenger Send API. One POST per message,
//! no retries: every failure is reported back to the caller as a distinct
//! [`MessengerError`] variant.

use http::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::messenger::config::MessengerConfig;
use crate::messenger::error::{MessengerError, MessengerResult};
use crate::messenger::events::{SendMessage, SendResponse};

/// Error envelope returned by the Graph API on failure
#[derive(Debug, Deserialize)]
struct GraphErrorBody {
    error: GraphError,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    #[serde(default)]
    message: String,
}

/// Client for the Messenger Send API
#[derive(Clone)]
pub struct SendApiClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl SendApiClient {
    /// Build a client from the webhook configuration
    ///
    /// # Errors
    ///
    /// Returns `MessengerError::Request` if the HTTP client cannot be built.
    pub fn new(config: &MessengerConfig) -> MessengerResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.send_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(MessengerError::Request)?;

        Ok(Self::with_client(http, config))
    }

    /// Build a client around an existing `reqwest::Client`
    pub fn with_client(http: reqwest::Client, config: &MessengerConfig) -> Self {
        let mut endpoint = config.send_api_url.clone();
        endpoint
            .query_pairs_mut()
            .append_pair("access_token", config.page_access_token());

        Self { http, endpoint }
    }

    /// Send a message and return the platform acknowledgment
    #[instrument(skip(self, message), fields(recipient_id = %message.recipient.id))]
    pub async fn send(&self, message: &SendMessage) -> MessengerResult<SendResponse> {
        let body = serde_json::to_vec(message).map_err(MessengerError::Encode)?;

        let request = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .build()
            .map_err(MessengerError::Request)?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(MessengerError::Transport)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(MessengerError::Transport)?;
        debug!(status = status.as_u16(), len = bytes.len(), "Send API responded");

        if !status.is_success() {
            let message = serde_json::from_slice::<GraphErrorBody>(&bytes)
                .map(|body| body.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
            return Err(MessengerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(MessengerError::Decode)
    }
}
