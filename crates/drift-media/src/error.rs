use thiserror::Error;

/// Errors produced by the media layer.
///
/// Authorization and transfer failures are surfaced to the user and abort
/// the attachment send; cache and playback failures degrade silently.
#[derive(Error, Debug)]
pub enum MediaError {
    /// Attachment upload requires a resolved identity.
    #[error("User is not authenticated")]
    NotAuthenticated,

    /// A required device capability permission was denied.
    #[error("Permission denied: {0}")]
    PermissionDenied(&'static str),

    /// Reading a local or remote resource failed.
    #[error("Failed to fetch resource: {0}")]
    Fetch(String),

    /// Uploading to the blob store failed.
    #[error("Failed to upload attachment: {0}")]
    Upload(String),

    /// Attachment exceeds the upload limit.
    #[error("Attachment too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    /// Failed to determine a platform cache directory.
    #[error("Could not determine application cache directory")]
    NoCacheDir,

    /// Filesystem error in the playback cache.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MediaError>;
