//! Normalization of raw remote-store records into the `Message` shape.
//!
//! The remote store guarantees very little about individual documents:
//! author fields and timestamps can be absent, and a malformed writer could
//! set more than one payload field. Normalization applies stable defaults so
//! the rest of the pipeline only ever sees well-formed messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{UNKNOWN_AUTHOR_ID, UNKNOWN_AUTHOR_NAME};
use crate::list::dedup_by_id;
use crate::types::{Author, Coordinates, Message, MessagePayload};

/// A raw message document as delivered by a remote-store subscription batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteRecord {
    pub id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub author: Option<RemoteAuthor>,
    pub text: Option<String>,
    pub image: Option<String>,
    pub audio: Option<String>,
    pub location: Option<Coordinates>,
    pub system: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteAuthor {
    pub id: Option<String>,
    pub display_name: Option<String>,
}

/// Normalize one raw record, applying field defaults: missing author id and
/// display name become the `unknown` sentinels, a missing timestamp becomes
/// `now`. When a record carries several payload fields the first of text,
/// image, audio, location wins.
pub fn normalize_record(record: RemoteRecord, now: DateTime<Utc>) -> Message {
    let RemoteAuthor { id, display_name } = record.author.unwrap_or_default();

    let payload = if let Some(text) = record.text {
        MessagePayload::Text(text)
    } else if let Some(url) = record.image {
        MessagePayload::Image(url)
    } else if let Some(url) = record.audio {
        MessagePayload::Audio(url)
    } else if let Some(position) = record.location {
        MessagePayload::Location(position)
    } else {
        MessagePayload::Text(String::new())
    };

    Message {
        id: record.id,
        created_at: record.created_at.unwrap_or(now),
        author: Author {
            id: id.unwrap_or_else(|| UNKNOWN_AUTHOR_ID.to_owned()),
            display_name: display_name.unwrap_or_else(|| UNKNOWN_AUTHOR_NAME.to_owned()),
        },
        payload,
        system: record.system.unwrap_or(false),
    }
}

/// Normalize a whole subscription batch, preserving delivery order and
/// dropping duplicate ids (first occurrence wins).
pub fn normalize_batch(records: Vec<RemoteRecord>, now: DateTime<Utc>) -> Vec<Message> {
    dedup_by_id(
        records
            .into_iter()
            .map(|record| normalize_record(record, now))
            .collect(),
    )
}
