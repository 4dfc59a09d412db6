//! Messenger Webhook Module
//!
//! Receives Messenger Platform page callbacks and answers text messages
//! through the Send API.
//!
//! - **Verification**: `hub.mode` / `hub.verify_token` handshake on GET
//! - **Typed Events**: callbacks decoded into message, postback or unknown events
//! - **Dispatch**: events routed to an [`EventHandler`], strictly in array order
//! - **Send API**: one JSON POST per reply, failures logged and never retried
//!
//! # Architecture
//!
//! ```text
//! Request -> Decode -> object == "page"? -> Dispatcher -> Handler -> Send API
//!               |              |
//!               v              v
//!          200 (no-op)        404
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use messenger_webhook::messenger::{
//!     webhook_router, EchoHandler, MessengerConfig, SendApiClient, WebhookState,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(MessengerConfig::from_env()?);
//!     let handler = Arc::new(EchoHandler::new(SendApiClient::new(&config)?));
//!     let state = WebhookState::new(config, handler);
//!
//!     let app = webhook_router(Arc::new(state));
//!     // ... serve with axum
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod handler;
pub mod send;
pub mod webhook;

// Re-export commonly used items
pub use config::MessengerConfig;
pub use dispatcher::{DispatchSummary, EventDispatcher};
pub use error::{MessengerError, MessengerResult, WebhookRejection};
pub use events::{
    Attachment, Callback, Entry, Message, Messaging, MessagingEvent, Postback, SendMessage,
    SendResponse,
};
pub use handler::{echo_reply, EchoHandler, EventHandler};
pub use send::SendApiClient;
pub use webhook::{webhook_router, VerifyQuery, WebhookState, WEBHOOK_PATH};
