use thiserror::Error;

/// Errors produced by the cache layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The cached snapshot could not be serialized or parsed.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The connection lock was poisoned by a panicking writer.
    #[error("Cache lock poisoned")]
    Poisoned,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
