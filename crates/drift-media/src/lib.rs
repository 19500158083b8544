//! # drift-media
//!
//! Attachment resolution and audio playback support for the Drift pipeline:
//! turning local resources (camera/library images, finished recordings,
//! device coordinates) into durable message drafts, and serving remote audio
//! references from a download-once local cache.

pub mod attach;
pub mod audio_cache;
pub mod fetch;
pub mod player;

mod error;

pub use attach::{AttachmentPipeline, BlobStore, LocationProvider, ResourceLoader};
pub use audio_cache::AudioCache;
pub use error::MediaError;
pub use fetch::{HttpMediaFetcher, MediaFetcher};
pub use player::{AudioPlayer, PlaybackError, PlaybackState};
