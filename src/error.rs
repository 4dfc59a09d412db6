//! Error types for the Messenger webhook server
//!
//! Each layer owns its `thiserror` enum; this module wraps them into the
//! crate-level [`Error`] used by server assembly and startup.

use thiserror::Error;

use crate::messenger::MessengerError;

/// The main error type for webhook server operations
#[derive(Error, Debug)]
pub enum Error {
    /// Messenger configuration or Send API errors
    #[error("Messenger error: {0}")]
    Messenger(#[from] MessengerError),

    /// I/O errors (binding, serving)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for webhook server operations
pub type Result<T> = std::result::Result<T, Error>;
