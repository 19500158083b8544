//! Key-value storage backed by SQLite.
//!
//! The pipeline persists exactly one small serialized blob (the message
//! snapshot), so a single `kv` table is all the schema there is. The
//! connection sits behind a mutex so one store handle can be shared across
//! tasks.

use std::path::Path;
use std::sync::Mutex;

use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{Result, StoreError};

/// SQLite-backed string key-value store.
pub struct KvStore {
    conn: Mutex<Connection>,
}

impl KvStore {
    /// Open (or create) the default store in the platform data directory:
    /// - Linux:   `~/.local/share/drift/drift.db`
    /// - macOS:   `~/Library/Application Support/app.drift.drift/drift.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\drift\drift\data\drift.db`
    pub fn new() -> Result<Self> {
        let project_dirs = ProjectDirs::from("app", "drift", "drift").ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("drift.db");
        tracing::info!(path = %db_path.display(), "opening cache store");

        Self::open_at(&db_path)
    }

    /// Open (or create) a store at an explicit path.
    ///
    /// Useful for tests and for embedding the store inside custom directory
    /// layouts.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::init(conn)
    }

    /// Open a store that lives only in memory. Used by tests and the smoke
    /// binary.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}
