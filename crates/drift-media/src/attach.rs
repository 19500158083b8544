//! The attachment pipeline: local resource → durable reference → draft.
//!
//! Image and audio resources are uploaded to the blob store under a key
//! namespaced by the sending user; locations resolve inline with no upload
//! step. Any failure aborts before a draft exists, so no partial message is
//! ever constructed.

use std::future::Future;

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use drift_core::constants::MAX_ATTACHMENT_SIZE;
use drift_core::{AttachmentEnvelope, Author, Coordinates, MessageDraft};

use crate::error::{MediaError, Result};

/// Binary object store with upload / download-by-key semantics.
///
/// Key collisions are avoided by caller-generated random ids.
pub trait BlobStore: Send + Sync {
    fn upload(&self, key: &str, data: Bytes) -> impl Future<Output = Result<()>> + Send;

    /// Durable download reference for a previously uploaded key.
    fn download_url_for(&self, key: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Reads a local resource handle (camera capture, library pick, finished
/// recording) into bytes.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, uri: &str) -> impl Future<Output = Result<Bytes>> + Send;
}

/// Device location capability.
pub trait LocationProvider: Send + Sync {
    fn request_permission(&self) -> impl Future<Output = bool> + Send;

    fn current_position(&self) -> impl Future<Output = Result<Coordinates>> + Send;
}

/// Resolves compose-time attachments into single-payload message drafts.
pub struct AttachmentPipeline<B, L> {
    blobs: B,
    loader: L,
}

impl<B: BlobStore, L: ResourceLoader> AttachmentPipeline<B, L> {
    pub fn new(blobs: B, loader: L) -> Self {
        Self { blobs, loader }
    }

    /// Upload a captured or picked image and resolve it into a draft.
    pub async fn resolve_image(
        &self,
        identity: Option<&Author>,
        local_uri: &str,
    ) -> Result<MessageDraft> {
        let url = self
            .upload_resource(identity, local_uri, "uploads", "jpg")
            .await?;
        Ok(AttachmentEnvelope::Image(url).into())
    }

    /// Upload a finished audio recording and resolve it into a draft.
    pub async fn resolve_audio(
        &self,
        identity: Option<&Author>,
        local_uri: &str,
    ) -> Result<MessageDraft> {
        let url = self
            .upload_resource(identity, local_uri, "audio", "m4a")
            .await?;
        Ok(AttachmentEnvelope::Audio(url).into())
    }

    /// Read the current device coordinates and resolve them inline.
    pub async fn resolve_location<P: LocationProvider>(
        &self,
        provider: &P,
    ) -> Result<MessageDraft> {
        if !provider.request_permission().await {
            return Err(MediaError::PermissionDenied("location"));
        }
        let position = provider.current_position().await?;
        Ok(AttachmentEnvelope::Location(position).into())
    }

    async fn upload_resource(
        &self,
        identity: Option<&Author>,
        local_uri: &str,
        prefix: &str,
        extension: &str,
    ) -> Result<String> {
        let author = identity.ok_or(MediaError::NotAuthenticated)?;

        let data = self.loader.load(local_uri).await?;
        if data.len() > MAX_ATTACHMENT_SIZE {
            return Err(MediaError::TooLarge {
                size: data.len(),
                max: MAX_ATTACHMENT_SIZE,
            });
        }

        let key = format!("{prefix}/{}/{}.{extension}", author.id, Uuid::new_v4());
        self.blobs.upload(&key, data).await?;
        let url = self.blobs.download_url_for(&key).await?;

        info!(key = %key, "Attachment uploaded");
        Ok(url)
    }
}
