//! Messenger Event Types
//!
//! Strongly-typed representations of Messenger Platform webhook callbacks and
//! the Send API payloads used to answer them.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::messenger::error::{MessengerError, MessengerResult};

/// `object` value carried by callbacks for page subscriptions
pub const PAGE_OBJECT: &str = "page";

// =============================================================================
// Inbound Callback Types
// =============================================================================

/// Top-level webhook callback envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Callback {
    /// Subscription object type, `"page"` for page events
    #[serde(default)]
    pub object: String,

    /// Batched entries, in delivery order
    #[serde(default)]
    pub entry: Vec<Entry>,
}

impl Callback {
    /// Parse from raw JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> MessengerResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| MessengerError::InvalidPayload(e.to_string()))
    }

    /// Whether this callback belongs to a page subscription
    pub fn is_page(&self) -> bool {
        self.object == PAGE_OBJECT
    }

    /// Iterate every messaging item across all entries, in array order
    pub fn messaging(&self) -> impl Iterator<Item = &Messaging> {
        self.entry.iter().flat_map(|entry| entry.messaging.iter())
    }
}

/// One batch of events for a single page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entry {
    /// Page ID
    #[serde(default)]
    pub id: String,

    /// Time of update (epoch milliseconds)
    #[serde(default)]
    pub time: i64,

    /// Messaging events contained in this entry
    #[serde(default)]
    pub messaging: Vec<Messaging>,
}

impl Entry {
    /// Entry time as a UTC timestamp, if it is set and in range
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        if self.time == 0 {
            return None;
        }
        Utc.timestamp_millis_opt(self.time).single()
    }
}

/// Page-scoped user or page identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Page-scoped ID
    #[serde(default)]
    pub id: String,
}

/// One event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RawMessaging", into = "RawMessaging")]
pub struct Messaging {
    /// Who triggered the event
    pub sender: Participant,
    /// The page receiving the event
    pub recipient: Participant,
    /// Event time (epoch milliseconds), when provided
    pub timestamp: Option<i64>,
    /// The event carried by this envelope
    pub event: MessagingEvent,
}

/// The kind of event carried by a [`Messaging`] envelope
#[derive(Debug, Clone, PartialEq)]
pub enum MessagingEvent {
    /// A user sent a message to the page
    Message(Message),
    /// A user tapped a postback button
    Postback(Postback),
    /// Anything else (deliveries, reads, optins, ...)
    Unknown,
}

impl MessagingEvent {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::Postback(_) => "postback",
            Self::Unknown => "unknown",
        }
    }
}

/// Wire shape of a messaging item, with both event fields optional
#[derive(Serialize, Deserialize)]
struct RawMessaging {
    #[serde(default)]
    sender: Participant,
    #[serde(default)]
    recipient: Participant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    postback: Option<Postback>,
}

impl From<RawMessaging> for Messaging {
    fn from(raw: RawMessaging) -> Self {
        let event = match (raw.message, raw.postback) {
            (Some(message), postback) => {
                if postback.is_some() {
                    tracing::warn!(
                        sender_id = %raw.sender.id,
                        "Messaging item carries both message and postback, using message"
                    );
                }
                MessagingEvent::Message(message)
            }
            (None, Some(postback)) => MessagingEvent::Postback(postback),
            (None, None) => MessagingEvent::Unknown,
        };

        Self {
            sender: raw.sender,
            recipient: raw.recipient,
            timestamp: raw.timestamp,
            event,
        }
    }
}

impl From<Messaging> for RawMessaging {
    fn from(messaging: Messaging) -> Self {
        let (message, postback) = match messaging.event {
            MessagingEvent::Message(message) => (Some(message), None),
            MessagingEvent::Postback(postback) => (None, Some(postback)),
            MessagingEvent::Unknown => (None, None),
        };

        Self {
            sender: messaging.sender,
            recipient: messaging.recipient,
            timestamp: messaging.timestamp,
            message,
            postback,
        }
    }
}

// =============================================================================
// Message Types
// =============================================================================

/// Inbound text message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Message ID
    #[serde(default)]
    pub mid: String,
    /// Sequence number
    #[serde(default)]
    pub seq: u64,
    /// Message text
    #[serde(default)]
    pub text: String,
    /// Quick reply the user tapped, if any
    #[serde(default, alias = "quickreply", skip_serializing_if = "Option::is_none")]
    pub quick_reply: Option<QuickReply>,
    /// Attachments (decoded, not processed)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

/// Quick reply payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickReply {
    /// Developer-defined payload
    #[serde(default)]
    pub payload: String,
}

/// Message attachment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    /// Attachment type (image, audio, video, file, ...)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Attachment payload
    #[serde(default)]
    pub payload: AttachmentPayload,
}

/// Attachment payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentPayload {
    /// Location of the attached media
    #[serde(default)]
    pub url: Option<String>,
}

// =============================================================================
// Postback Types
// =============================================================================

/// Inbound postback (button tap)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Postback {
    /// Button title
    #[serde(default)]
    pub title: String,
    /// Developer-defined payload
    #[serde(default)]
    pub payload: String,
    /// Referral information, when the postback came from a link or ad
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral: Option<Referral>,
}

/// Referral information attached to a postback
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Referral {
    /// `ref` parameter of the link
    #[serde(rename = "ref", default)]
    pub reference: String,
    /// Referral source (SHORTLINK, ADS, ...)
    #[serde(default)]
    pub source: String,
    /// Referral type (OPEN_THREAD, ...)
    #[serde(rename = "type", default)]
    pub kind: String,
}

// =============================================================================
// Send API Types
// =============================================================================

/// Outbound Send API payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessage {
    /// Who receives the message
    pub recipient: Participant,
    /// What is sent
    pub message: OutgoingText,
}

/// Text body of an outbound message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingText {
    /// Message text
    pub text: String,
}

impl SendMessage {
    /// Build a plain text message addressed to `recipient_id`
    pub fn text(recipient_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            recipient: Participant {
                id: recipient_id.into(),
            },
            message: OutgoingText { text: text.into() },
        }
    }
}

/// Send API acknowledgment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendResponse {
    /// Recipient the message was delivered to
    pub recipient_id: String,
    /// ID of the created message
    pub message_id: String,
}
