pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod threads;

use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::info;

use parley_types::events::ChatChange;

pub use error::{Result, StoreError};

/// Capacity of the chat change feed. Slow subscribers see `Lagged`.
const CHANGE_FEED_CAPACITY: usize = 256;

pub struct Database {
    conn: Mutex<Connection>,
    changes: broadcast::Sender<ChatChange>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads from other processes
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::with_connection(conn)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        migrations::run(&conn)?;

        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Ok(Self {
            conn: Mutex::new(conn),
            changes,
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&conn)
    }

    /// Subscribe to inserts and updates on the chat table.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<ChatChange> {
        self.changes.subscribe()
    }

    pub(crate) fn publish(&self, change: ChatChange) {
        // No subscribers is fine
        let _ = self.changes.send(change);
    }
}
