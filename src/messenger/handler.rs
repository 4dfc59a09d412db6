//! Event handlers
//!
//! [`EventHandler`] is the seam between decoded webhook events and whatever
//! the bot does with them. [`EchoHandler`] answers every text message by
//! quoting it back through the Send API.

use tracing::{error, info};

use crate::messenger::events::{Message, Postback, SendMessage};
use crate::messenger::send::SendApiClient;

/// Handler trait for messaging events
#[async_trait::async_trait]
pub trait EventHandler: Send + Sync + 'static {
    /// Handle a text message sent by `sender_id`
    async fn on_message(&self, sender_id: &str, message: &Message) -> anyhow::Result<()>;

    /// Handle a postback triggered by `sender_id`
    async fn on_postback(&self, _sender_id: &str, _postback: &Postback) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Reply text for an inbound message
pub fn echo_reply(text: &str) -> String {
    format!("Hello! You said {} to me.", quote(text))
}

/// Double-quote `text`, escaping only quotes, backslashes and control characters.
///
/// Printable Unicode (combining marks, variation selectors, ...) is kept as is.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0b}' => out.push_str("\\v"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Replies to each message by quoting its text
#[derive(Clone)]
pub struct EchoHandler {
    client: SendApiClient,
}

impl EchoHandler {
    /// Create a handler sending through `client`
    pub fn new(client: SendApiClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl EventHandler for EchoHandler {
    async fn on_message(&self, sender_id: &str, message: &Message) -> anyhow::Result<()> {
        let answer = SendMessage::text(sender_id, echo_reply(&message.text));
        info!(
            recipient_id = %answer.recipient.id,
            text = %answer.message.text,
            "Sending reply"
        );

        match self.client.send(&answer).await {
            Ok(response) => {
                info!(
                    recipient_id = %response.recipient_id,
                    message_id = %response.message_id,
                    "Reply delivered"
                );
                Ok(())
            }
            Err(e) => {
                error!(recipient_id = %sender_id, error = %e, "Reply failed");
                Err(e.into())
            }
        }
    }
}
