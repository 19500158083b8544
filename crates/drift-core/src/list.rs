//! Ordering and uniqueness helpers for the in-memory message list.
//!
//! Canonical order is reverse-chronological (newest first), matching the
//! remote store's query order. The rendering layer inverts for display if it
//! needs to.

use std::collections::HashSet;

use crate::types::Message;

/// True when the list is in canonical newest-first order.
pub fn is_newest_first(messages: &[Message]) -> bool {
    messages
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at)
}

/// Drop duplicate ids, keeping the first occurrence.
pub fn dedup_by_id(messages: Vec<Message>) -> Vec<Message> {
    let mut seen = HashSet::new();
    messages
        .into_iter()
        .filter(|message| seen.insert(message.id.clone()))
        .collect()
}
