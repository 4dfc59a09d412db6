//! Webhook configuration
//!
//! Secrets are read from the environment once at startup and shared read-only
//! with the endpoint and the Send API client afterwards.
//!
//! - `PAGE_ACCESS_TOKEN` (required): token appended to every Send API call
//! - `VERIFY_TOKEN` (required): shared secret checked during the subscription handshake
//! - `SEND_API_URL` (optional): Send API endpoint override
//! - `SEND_TIMEOUT_SECS` (optional): timeout for Send API calls, none by default

use std::env;
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::messenger::error::{MessengerError, MessengerResult};

/// Default Send API endpoint
pub const DEFAULT_SEND_API_URL: &str = "https://graph.facebook.com/v2.6/me/messages";

/// Environment variable holding the page access token
pub const PAGE_ACCESS_TOKEN_ENV: &str = "PAGE_ACCESS_TOKEN";

/// Environment variable holding the verify token
pub const VERIFY_TOKEN_ENV: &str = "VERIFY_TOKEN";

/// Environment variable overriding the Send API endpoint
pub const SEND_API_URL_ENV: &str = "SEND_API_URL";

/// Environment variable setting the Send API timeout in seconds
pub const SEND_TIMEOUT_ENV: &str = "SEND_TIMEOUT_SECS";

/// Messenger webhook configuration
#[derive(Clone)]
pub struct MessengerConfig {
    page_access_token: String,
    verify_token: String,
    /// Send API endpoint (without the access token)
    pub send_api_url: Url,
    /// Timeout applied to Send API calls
    pub send_timeout: Option<Duration>,
}

impl MessengerConfig {
    /// Create a configuration with the default Send API endpoint and no timeout
    pub fn new(page_access_token: impl Into<String>, verify_token: impl Into<String>) -> Self {
        Self {
            page_access_token: page_access_token.into(),
            verify_token: verify_token.into(),
            send_api_url: default_send_api_url(),
            send_timeout: None,
        }
    }

    /// Point the Send API client at another endpoint
    pub fn with_send_api_url(mut self, url: Url) -> Self {
        self.send_api_url = url;
        self
    }

    /// Bound every Send API call by `timeout`
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `MessengerError::MissingEnv` if either token is unset or empty, and
    /// `MessengerError::InvalidEnv` if an optional variable does not parse.
    pub fn from_env() -> MessengerResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> MessengerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(MessengerError::MissingEnv(name))
        };

        let page_access_token = required(PAGE_ACCESS_TOKEN_ENV)?;
        let verify_token = required(VERIFY_TOKEN_ENV)?;

        let mut config = Self::new(page_access_token, verify_token);

        if let Some(raw) = lookup(SEND_API_URL_ENV).filter(|v| !v.is_empty()) {
            let url = Url::parse(&raw).map_err(|e| MessengerError::InvalidEnv {
                name: SEND_API_URL_ENV,
                reason: e.to_string(),
            })?;
            config = config.with_send_api_url(url);
        }

        if let Some(raw) = lookup(SEND_TIMEOUT_ENV).filter(|v| !v.is_empty()) {
            let secs = raw
                .parse::<u64>()
                .map_err(|e| MessengerError::InvalidEnv {
                    name: SEND_TIMEOUT_ENV,
                    reason: e.to_string(),
                })?;
            if secs == 0 {
                return Err(MessengerError::InvalidEnv {
                    name: SEND_TIMEOUT_ENV,
                    reason: "timeout cannot be 0".to_string(),
                });
            }
            config = config.with_send_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Create a test configuration (for testing only)
    #[cfg(test)]
    pub fn test_config() -> Self {
        Self::new("test-page-token", "test-verify-token")
    }

    /// Page access token for Send API calls
    pub fn page_access_token(&self) -> &str {
        &self.page_access_token
    }

    /// Check a handshake token against the configured verify token
    pub fn verify_token_matches(&self, token: &str) -> bool {
        constant_time_compare(self.verify_token.as_bytes(), token.as_bytes())
    }
}

impl fmt::Debug for MessengerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessengerConfig")
            .field("page_access_token", &"<redacted>")
            .field("verify_token", &"<redacted>")
            .field("send_api_url", &self.send_api_url.as_str())
            .field("send_timeout", &self.send_timeout)
            .finish()
    }
}

fn default_send_api_url() -> Url {
    // Constant input, parsing cannot fail
    Url::parse(DEFAULT_SEND_API_URL).expect("default Send API URL is valid")
}

/// Constant-time byte comparison
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
