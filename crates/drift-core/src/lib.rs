//! # drift-core
//!
//! Shared domain model for the Drift chat pipeline: the message shape, the
//! normalization rules applied to raw remote-store records, and the ordering
//! and uniqueness helpers every other crate leans on.
//!
//! This crate is intentionally free of I/O; everything here is pure data.

pub mod constants;
pub mod list;
pub mod normalize;
pub mod types;

pub use normalize::{normalize_batch, normalize_record};
pub use types::*;
