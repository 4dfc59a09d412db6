//! Messenger Webhook - Page Message Echo Bot
//!
//! This crate receives Messenger Platform webhook callbacks for a page and
//! answers each text message through the Send API.
//!
//! # Features
//!
//! - **Verification Handshake**: `hub.mode` / `hub.verify_token` / `hub.challenge` on GET
//! - **Typed Callbacks**: page callbacks decoded into message and postback events
//! - **Ordered Dispatch**: events routed to an [`messenger::EventHandler`] in delivery order
//! - **Send API Client**: JSON replies posted with the page access token
//!
//! # Architecture
//!
//! ```text
//! Messenger Platform ──▶ /webhook ──▶ EventDispatcher ──▶ EchoHandler
//!                           │                                  │
//!                           ▼                                  ▼
//!                    GET handshake                      SendApiClient
//!                    (challenge)                    POST /v2.6/me/messages
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use messenger_webhook::messenger::MessengerConfig;
//! use messenger_webhook::server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(MessengerConfig::from_env()?);
//!     let app = server::echo_app(config)?;
//!
//!     server::serve(([0, 0, 0, 0], server::DEFAULT_PORT).into(), app).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod handlers;
pub mod messenger;
pub mod server;

// Re-exports for convenience
pub use error::{Error, Result};
pub use messenger::{EchoHandler, EventHandler, MessengerConfig, SendApiClient};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
