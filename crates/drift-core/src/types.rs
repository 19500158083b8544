//! Domain model structs shared by every Drift crate.
//!
//! Every persisted shape derives `Serialize` and `Deserialize` so the
//! message list can be mirrored to the local cache and handed to a rendering
//! layer unchanged. Field names follow the remote store's document layout
//! (camelCase, payload fields at the top level).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::SYSTEM_AUTHOR_ID;

// ---------------------------------------------------------------------------
// Author
// ---------------------------------------------------------------------------

/// The author of a message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Opaque stable identifier issued by the identity provider.
    pub id: String,
    /// Human-readable display name chosen at sign-in.
    pub display_name: String,
}

impl Author {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// A device position attached to a location message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    #[serde(rename = "latitude")]
    pub lat: f64,
    #[serde(rename = "longitude")]
    pub lon: f64,
}

/// The primary payload of a message. Exactly one per message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum MessagePayload {
    /// Plain text body.
    Text(String),
    /// Durable download reference to an uploaded image.
    Image(String),
    /// Durable download reference to an uploaded audio recording.
    Audio(String),
    /// Inline coordinates; no upload involved.
    Location(Coordinates),
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single chat message as rendered and cached.
///
/// Immutable once created. `id` is the remote document id, or a locally
/// generated unique id for not-yet-acknowledged sends and session notices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub author: Author,
    #[serde(flatten)]
    pub payload: MessagePayload,
    /// Session-lifecycle notice rendered without an author bubble.
    #[serde(default, skip_serializing_if = "is_false")]
    pub system: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Message {
    /// Local session notice; never persisted to the remote store.
    pub fn system(text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_local_id(),
            created_at,
            author: Author::new(SYSTEM_AUTHOR_ID, ""),
            payload: MessagePayload::Text(text.into()),
            system: true,
        }
    }
}

/// Generate a unique id for locally composed messages.
pub fn new_local_id() -> String {
    Uuid::new_v4().to_string()
}

// ---------------------------------------------------------------------------
// Outbound shapes
// ---------------------------------------------------------------------------

/// A resolved attachment reference ready for inclusion in a message.
///
/// Produced by the attachment pipeline, consumed immediately by draft
/// construction, never retained.
#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentEnvelope {
    Image(String),
    Audio(String),
    Location(Coordinates),
}

/// An outgoing message as composed by the user, before the send gate
/// attaches identity and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDraft {
    pub payload: MessagePayload,
}

impl MessageDraft {
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            payload: MessagePayload::Text(body.into()),
        }
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self {
            payload: MessagePayload::Image(url.into()),
        }
    }

    pub fn audio(url: impl Into<String>) -> Self {
        Self {
            payload: MessagePayload::Audio(url.into()),
        }
    }

    pub fn location(position: Coordinates) -> Self {
        Self {
            payload: MessagePayload::Location(position),
        }
    }
}

impl From<AttachmentEnvelope> for MessageDraft {
    fn from(envelope: AttachmentEnvelope) -> Self {
        match envelope {
            AttachmentEnvelope::Image(url) => Self::image(url),
            AttachmentEnvelope::Audio(url) => Self::audio(url),
            AttachmentEnvelope::Location(position) => Self::location(position),
        }
    }
}

/// The insert request handed to the remote store for a validated send.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutboundRecord {
    pub created_at: DateTime<Utc>,
    pub author: Author,
    #[serde(flatten)]
    pub payload: MessagePayload,
}
