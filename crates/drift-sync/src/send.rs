//! Outbound send validation.
//!
//! A send is blocked, silently, when the session is offline or the identity
//! is not yet resolved; otherwise it becomes a remote insert plus an
//! optimistic local copy. The optimistic copy carries a fresh local id and
//! is never reconciled against the remote echo by content, so the two can be
//! visible together until the next full batch replacement flushes the local
//! copy out.

use chrono::{DateTime, Utc};

use drift_core::{new_local_id, Author, Message, MessageDraft, OutboundRecord};

/// Outcome of gate validation for one outgoing draft.
#[derive(Debug, Clone, PartialEq)]
pub enum SendDecision {
    /// Forward `record` to the remote store and prepend `local` in memory.
    Accept {
        record: OutboundRecord,
        local: Message,
    },
    /// Connectivity gate reports offline; drop the draft.
    RejectedOffline,
    /// No identity yet; drop the draft.
    RejectedNoIdentity,
}

/// Validate a draft against the connectivity and identity preconditions.
pub fn evaluate_send(
    online: bool,
    identity: Option<&Author>,
    draft: MessageDraft,
    now: DateTime<Utc>,
) -> SendDecision {
    if !online {
        return SendDecision::RejectedOffline;
    }
    let Some(author) = identity else {
        return SendDecision::RejectedNoIdentity;
    };

    let record = OutboundRecord {
        created_at: now,
        author: author.clone(),
        payload: draft.payload.clone(),
    };
    let local = Message {
        id: new_local_id(),
        created_at: now,
        author: author.clone(),
        payload: draft.payload,
        system: false,
    };

    SendDecision::Accept { record, local }
}
