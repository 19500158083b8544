use thiserror::Error;

/// Errors produced by remote-store collaborators.
///
/// Nothing here is fatal to a session: a failed subscribe defers to the
/// cached snapshot and a failed insert is logged and dropped.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Opening the live subscription failed.
    #[error("Remote subscribe failed: {0}")]
    Subscribe(String),

    /// Forwarding an insert to the remote store failed.
    #[error("Remote insert failed: {0}")]
    Insert(String),
}
