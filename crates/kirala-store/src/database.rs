//! Database connection management.
//!
//! The [`Database`] struct owns a [`rusqlite::Connection`] and guarantees
//! that migrations are run before any other operation.  It also owns the
//! change hub; every mutating helper publishes the collection it touched so
//! live views can re-render.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::error::{Result, StoreError};
use crate::migrations;
use crate::watch::{ChangeHub, Collection, StoreEvent};

/// Wrapper around a [`rusqlite::Connection`] plus the change hub.
pub struct Database {
    conn: Connection,
    hub: ChangeHub,
}

impl Database {
    /// Open (or create) the default application database.
    ///
    /// The database file is placed in the platform-appropriate data
    /// directory:
    /// - Linux:   `~/.local/share/oyna-kirala/kirala.db`
    /// - macOS:   `~/Library/Application Support/com.oynakirala.oyna-kirala/kirala.db`
    /// - Windows: `{FOLDERID_RoamingAppData}\oynakirala\oyna-kirala\data\kirala.db`
    pub fn new() -> Result<Self> {
        let project_dirs =
            ProjectDirs::from("com", "oynakirala", "oyna-kirala").ok_or(StoreError::NoDataDir)?;

        let data_dir = project_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join("kirala.db");

        tracing::info!(path = %db_path.display(), "opening database");

        Self::open_at(&db_path)
    }

    /// Open (or create) a database at an explicit path.
    ///
    /// This is useful for tests and for embedding the store inside custom
    /// directory layouts.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Recommended SQLite settings.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        // Run schema migrations.
        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn,
            hub: ChangeHub::new(),
        })
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    ///
    /// Callers should prefer the typed CRUD helpers, but direct access is
    /// occasionally needed for transactions or ad-hoc queries.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Return the filesystem path of the open database (if any).
    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }

    /// Subscribe to change notifications.
    ///
    /// The receiver yields a [`StoreEvent`] for every mutation until it is
    /// dropped; dropping it is the unsubscribe.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.hub.subscribe()
    }

    pub(crate) fn notify(&self, collection: Collection, key: Option<String>) {
        self.hub.publish(collection, key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        let db = Database::open_at(&path).expect("should open");
        assert!(db.path().is_some());
    }
}
