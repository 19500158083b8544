//! The local cache adapter: serializes the message list to and from a
//! durable key-value store under a single well-known key.

use std::sync::Arc;

use drift_core::constants::MESSAGES_CACHE_KEY;
use drift_core::Message;

use crate::error::Result;
use crate::kv::KvStore;

/// Minimal contract the pipeline needs from a durable key-value store:
/// best-effort string get/set with no transactional guarantee across keys.
pub trait LocalCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl LocalCache for KvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        KvStore::get(self, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        KvStore::set(self, key, value)
    }
}

impl<C: LocalCache> LocalCache for Arc<C> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// Snapshot adapter over a [`LocalCache`].
///
/// Only ever holds a serialized copy of the list, never a live reference;
/// the synchronization engine remains the single owner of the in-memory
/// list.
pub struct MessageCache<C> {
    cache: C,
    key: String,
}

impl<C: LocalCache> MessageCache<C> {
    pub fn new(cache: C) -> Self {
        Self::with_key(cache, MESSAGES_CACHE_KEY)
    }

    pub fn with_key(cache: C, key: impl Into<String>) -> Self {
        Self {
            cache,
            key: key.into(),
        }
    }

    /// Write-through of the whole list. Callers treat failures as
    /// best-effort and log them.
    pub fn save(&self, messages: &[Message]) -> Result<()> {
        let encoded = serde_json::to_string(messages)?;
        self.cache.set(&self.key, &encoded)
    }

    /// Read the cached snapshot. `Ok(None)` when nothing was ever written;
    /// an unparseable snapshot is an error the caller absorbs.
    pub fn load(&self) -> Result<Option<Vec<Message>>> {
        match self.cache.get(&self.key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}
