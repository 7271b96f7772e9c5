//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees that
//! migrations are run before any other operation.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;

use crate::error::{Result, StoreError};
use crate::migrations;

/// Wrapper around a [`rusqlite::Connection`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the default local storage database.
    ///
    /// The file is placed in the platform data directory:
    /// - Linux:   `~/.local/share/unisync/unisync.db`
    /// - macOS:   `~/Library/Application Support/edu.unisync.unisync/unisync.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\unisync\unisync\data\unisync.db`
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("edu", "unisync", "unisync").ok_or(StoreError::NoDataDir)?;
        Self::open_in(project_dirs.data_dir())
    }

    /// Open (or create) `unisync.db` inside `dir`, creating the directory.
    pub fn open_in(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let db_path = dir.join("unisync.db");
        tracing::info!(path = %db_path.display(), "opening local storage");
        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open a throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}
