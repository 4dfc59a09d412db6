//! Event Dispatch
//!
//! Walks a decoded callback and routes every messaging item to the matching
//! handler method.
//!
//! ```text
//! Callback
//!    |
//!    v
//! [for each Entry, for each Messaging, in order]
//!    |
//!    +--> Message  --> on_message
//!    +--> Postback --> on_postback
//!    +--> Unknown  --> skipped
//! ```
//!
//! Items are handled one after another; a handler error is logged and does not
//! stop the remaining items.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::messenger::events::{Callback, MessagingEvent};
use crate::messenger::handler::EventHandler;

/// Counts of what a dispatch pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Message handler invocations
    pub messages: usize,
    /// Postback handler invocations
    pub postbacks: usize,
    /// Items carrying neither a message nor a postback
    pub skipped: usize,
    /// Handler invocations that returned an error
    pub failed: usize,
}

impl DispatchSummary {
    /// Total handler invocations
    pub fn handled(&self) -> usize {
        self.messages + self.postbacks
    }
}

/// Routes callback events to an [`EventHandler`]
pub struct EventDispatcher<H: EventHandler> {
    handler: Arc<H>,
}

impl<H: EventHandler> EventDispatcher<H> {
    /// Create a dispatcher for `handler`
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Dispatch every messaging item of `callback`, in array order
    pub async fn dispatch(&self, callback: &Callback) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for entry in &callback.entry {
            debug!(
                entry_id = %entry.id,
                time = ?entry.timestamp(),
                items = entry.messaging.len(),
                "Dispatching entry"
            );

            for messaging in &entry.messaging {
                let sender_id = messaging.sender.id.as_str();

                let result = match &messaging.event {
                    MessagingEvent::Message(message) => {
                        summary.messages += 1;
                        self.handler.on_message(sender_id, message).await
                    }
                    MessagingEvent::Postback(postback) => {
                        summary.postbacks += 1;
                        debug!(
                            sender_id = %sender_id,
                            payload = %postback.payload,
                            "Postback received"
                        );
                        self.handler.on_postback(sender_id, postback).await
                    }
                    MessagingEvent::Unknown => {
                        summary.skipped += 1;
                        debug!(sender_id = %sender_id, "Ignoring unsupported messaging event");
                        continue;
                    }
                };

                if let Err(e) = result {
                    summary.failed += 1;
                    warn!(
                        sender_id = %sender_id,
                        event = messaging.event.kind(),
                        error = %e,
                        "Event handler failed"
                    );
                }
            }
        }

        summary
    }
}
