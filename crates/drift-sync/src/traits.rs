//! Contracts for the external collaborators the session depends on.
//!
//! Production backends (a hosted document store, an auth service, the OS
//! reachability signal) and test fakes implement the same traits; the engine
//! is injected with them at session creation.

use tokio::sync::mpsc;

use drift_core::normalize::RemoteRecord;
use drift_core::{Author, OutboundRecord};

use crate::error::SessionError;

/// A live change subscription to the remote message collection.
///
/// Every delivered batch is the full current result set, ordered newest
/// first. Dropping the subscription unsubscribes exactly once.
pub struct Subscription {
    batches: mpsc::Receiver<Vec<RemoteRecord>>,
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(
        batches: mpsc::Receiver<Vec<RemoteRecord>>,
        teardown: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            batches,
            teardown: Some(Box::new(teardown)),
        }
    }

    /// Next full result set, or `None` when the backend closed the stream.
    pub async fn next_batch(&mut self) -> Option<Vec<RemoteRecord>> {
        self.batches.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

/// Query-and-subscribe document store used for message persistence.
pub trait RemoteStore: Send + 'static {
    /// Open the live subscription for the chat's message collection,
    /// ordered by creation time descending. The session holds at most one
    /// at a time and always drops the old one before opening a new one.
    fn subscribe(&self) -> Result<Subscription, SessionError>;

    /// Fire-and-forget insert; the write comes back through the
    /// subscription, so no synchronous acknowledgement is expected.
    fn insert(&self, record: OutboundRecord) -> Result<(), SessionError>;

    /// Hint that background work should stop or resume for this session.
    fn set_network_enabled(&self, enabled: bool);
}

/// Authentication service yielding a stable per-user identity.
pub trait IdentityProvider {
    /// Stream of identity changes; delivers `None` until an identity is
    /// established.
    fn identity_stream(&self) -> mpsc::Receiver<Option<Author>>;
}

/// Source of online/offline reachability transitions.
pub trait NetworkMonitor {
    /// Current signal, read once at session startup.
    fn is_online(&self) -> bool;

    /// Asynchronous transition events. Consecutive duplicates are possible;
    /// the connectivity gate deduplicates them.
    fn connectivity_stream(&self) -> mpsc::Receiver<bool>;
}
