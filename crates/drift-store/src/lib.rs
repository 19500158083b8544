//! # drift-store
//!
//! Local durable cache for the Drift message pipeline.
//!
//! The cache is an optimization, not a correctness requirement: every write
//! is best-effort, failures are logged and absorbed, and the online path
//! never depends on it. The whole message list is serialized on every write,
//! so consistency is bounded to "last full write wins".

pub mod kv;
pub mod snapshot;

mod error;

pub use error::StoreError;
pub use kv::KvStore;
pub use snapshot::{LocalCache, MessageCache};
