//! Messenger webhook error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while configuring the webhook or talking to the Send API
#[derive(Error, Debug)]
pub enum MessengerError {
    /// Required environment variable missing or empty
    #[error("{0} not set")]
    MissingEnv(&'static str),

    /// Environment variable present but unusable
    #[error("Invalid value for {name}: {reason}")]
    InvalidEnv {
        /// Variable name
        name: &'static str,
        /// Why it was rejected
        reason: String,
    },

    /// Callback body could not be decoded
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Outbound message could not be serialized
    #[error("Encoding error: {0}")]
    Encode(#[source] serde_json::Error),

    /// Outbound request could not be built
    #[error("Request error: {0}")]
    Request(#[source] reqwest::Error),

    /// Network or connection failure talking to the Send API
    #[error("Client error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Send API answered with a non-success status
    #[error("Send API error {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message reported by the platform
        message: String,
    },

    /// Send API answered with a body that is not an acknowledgment
    #[error("Decoding error: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Result type for Messenger operations
pub type MessengerResult<T> = std::result::Result<T, MessengerError>;

/// Ways the webhook endpoint turns a request away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookRejection {
    /// Verification handshake failed
    Forbidden,
    /// Callback is not for a page subscription
    NotPage,
    /// Method other than GET or POST
    MethodNotAllowed,
}

impl WebhookRejection {
    /// HTTP status sent back to the caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Forbidden | Self::MethodNotAllowed => StatusCode::FORBIDDEN,
            Self::NotPage => StatusCode::NOT_FOUND,
        }
    }

    /// Plain-text body sent back to the caller
    pub fn message(&self) -> &'static str {
        match self {
            Self::Forbidden => "Forbidden",
            Self::NotPage => "Not Found",
            Self::MethodNotAllowed => "No way",
        }
    }
}

impl IntoResponse for WebhookRejection {
    fn into_response(self) -> Response {
        (self.status_code(), self.message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_display() {
        let err = MessengerError::MissingEnv("VERIFY_TOKEN");
        assert_eq!(err.to_string(), "VERIFY_TOKEN not set");
    }

    #[test]
    fn test_api_error_display() {
        let err = MessengerError::Api {
            status: 400,
            message: "Invalid OAuth access token.".to_string(),
        };
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("Invalid OAuth access token."));
    }

    #[test]
    fn test_rejection_status_codes() {
        assert_eq!(
            WebhookRejection::Forbidden.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(WebhookRejection::NotPage.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            WebhookRejection::MethodNotAllowed.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(WebhookRejection::MethodNotAllowed.message(), "No way");
    }
}
