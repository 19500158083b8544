//! In-memory message list ownership and the state replacement rules.
//!
//! The engine never merges sources: while subscribed the list is exactly the
//! latest normalized remote batch, while cached-only it is exactly the
//! latest parseable snapshot. Every mutation is a whole-list replace or a
//! single prepend.

use chrono::{DateTime, Utc};

use drift_core::normalize::{normalize_batch, RemoteRecord};
use drift_core::{Author, Message};

/// Steady state of the synchronization engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Online with a known identity; one live remote subscription.
    Subscribed,
    /// Offline or identity unknown; serving the cached snapshot.
    CachedOnly,
}

/// Owns the authoritative in-memory message list for one chat session.
#[derive(Debug, Default)]
pub struct SyncEngine {
    messages: Vec<Message>,
    identity: Option<Author>,
    bootstrapped: bool,
}

impl SyncEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn identity(&self) -> Option<&Author> {
        self.identity.as_ref()
    }

    /// Update the resolved identity. Returns true when it actually changed.
    pub fn set_identity(&mut self, identity: Option<Author>) -> bool {
        if self.identity == identity {
            return false;
        }
        self.identity = identity;
        true
    }

    /// The state implied by the current connectivity and identity.
    pub fn state(&self, online: bool) -> SyncState {
        if online && self.identity.is_some() {
            SyncState::Subscribed
        } else {
            SyncState::CachedOnly
        }
    }

    /// Replace the whole list with a normalized remote batch.
    pub fn apply_batch(&mut self, records: Vec<RemoteRecord>, now: DateTime<Utc>) {
        self.messages = normalize_batch(records, now);
    }

    /// Replace the whole list with a cached snapshot, verbatim.
    pub fn apply_cached(&mut self, snapshot: Vec<Message>) {
        self.messages = snapshot;
    }

    /// Optimistic prepend of a locally composed message. The list is newest
    /// first, so the fresh message takes the front position.
    pub fn prepend(&mut self, message: Message) {
        self.messages.insert(0, message);
    }

    /// One-time session bootstrap: prepend a local system notice when no
    /// prior content exists. Returns true when the notice was added.
    pub fn bootstrap_welcome(&mut self, text: &str, now: DateTime<Utc>) -> bool {
        if self.bootstrapped {
            return false;
        }
        self.bootstrapped = true;
        if !self.messages.is_empty() {
            return false;
        }
        self.messages.insert(0, Message::system(text, now));
        true
    }
}
