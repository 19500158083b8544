//! On-demand local caching of remote audio references.
//!
//! The first playback of a reference downloads it into the cache directory;
//! every later playback is served from disk. Entries are never evicted
//! within a session. When the download fails, the remote reference itself is
//! returned so playback can fall back to streaming.

use std::path::PathBuf;

use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use drift_core::constants::AUDIO_CACHE_SUBDIR;

use crate::error::{MediaError, Result};
use crate::fetch::MediaFetcher;

/// Download-once cache for remote audio, keyed by sanitized file name.
pub struct AudioCache {
    dir: PathBuf,
}

impl AudioCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Cache directory under the platform cache location.
    pub fn in_default_location() -> Result<Self> {
        let project_dirs = directories::ProjectDirs::from("app", "drift", "drift")
            .ok_or(MediaError::NoCacheDir)?;
        Ok(Self::new(project_dirs.cache_dir().join(AUDIO_CACHE_SUBDIR)))
    }

    /// Deterministic cache file name for a remote reference: any query
    /// suffix stripped, the last path segment percent-decoded, and path
    /// separators replaced with an underscore.
    pub fn cache_file_name(remote_ref: &str) -> String {
        let without_query = remote_ref.split('?').next().unwrap_or(remote_ref);
        let raw = without_query.rsplit('/').next().unwrap_or(without_query);
        let decoded = percent_decode_str(raw).decode_utf8_lossy();
        decoded.replace(['/', '\\'], "_")
    }

    pub fn local_path_for(&self, remote_ref: &str) -> PathBuf {
        self.dir.join(Self::cache_file_name(remote_ref))
    }

    /// Existence probe against the remote reference. A failed probe means
    /// the caller shows an "unavailable" state and skips path resolution
    /// entirely.
    pub async fn is_available<F: MediaFetcher>(&self, fetcher: &F, remote_ref: &str) -> bool {
        fetcher.probe(remote_ref).await
    }

    /// Resolve a playable path, downloading on first use. Cache hits never
    /// touch the network; a failed download falls back to the remote
    /// reference.
    pub async fn resolve_local_path<F: MediaFetcher>(
        &self,
        fetcher: &F,
        remote_ref: &str,
    ) -> String {
        let local = self.local_path_for(remote_ref);
        if local.exists() {
            debug!(path = %local.display(), "Audio cache hit");
            return local.to_string_lossy().into_owned();
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!(error = %e, "Failed to create audio cache directory, streaming from remote");
            return remote_ref.to_owned();
        }

        match fetcher.download(remote_ref, &local).await {
            Ok(()) => {
                debug!(path = %local.display(), "Audio cached");
                local.to_string_lossy().into_owned()
            }
            Err(e) => {
                warn!(error = %e, url = %remote_ref, "Audio download failed, streaming from remote");
                remote_ref.to_owned()
            }
        }
    }
}
