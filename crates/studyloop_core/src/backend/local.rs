//! Local persistent storage adapters.
//!
//! # Responsibility
//! - Implement the `LocalStore` capability over SQLite for durable local
//!   data and over a plain map for tests and ephemeral sessions.
//!
//! # Invariants
//! - The trait surface never fails: SQLite errors are logged and degrade to
//!   `None`/no-op, matching the "never fails in normal operation" contract.
//! - The SQLite schema version is tracked via `PRAGMA user_version`.

use crate::backend::LocalStore;
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Key under which the planner aggregate is stored locally.
pub const LOCAL_STORAGE_KEY: &str = "studyPlannerData";

const SCHEMA_VERSION: u32 = 1;
const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS kv_entries (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);";

/// Error opening or preparing the SQLite-backed local store.
#[derive(Debug)]
pub enum LocalStoreError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion { found: u32, supported: u32 },
}

impl Display for LocalStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion { found, supported } => write!(
                f,
                "local store schema version {found} is newer than supported {supported}"
            ),
        }
    }
}

impl Error for LocalStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for LocalStoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// SQLite-backed key-value store for durable local persistence.
pub struct SqliteLocalStore {
    conn: Mutex<Connection>,
}

impl SqliteLocalStore {
    /// Opens (or creates) the store at the given file path.
    pub fn open(path: impl AsRef<Path>) -> Result<SqliteLocalStore, LocalStoreError> {
        let conn = Connection::open(path)?;
        Self::bootstrap(conn)
    }

    /// Opens an in-memory store, mainly for tests.
    pub fn open_in_memory() -> Result<SqliteLocalStore, LocalStoreError> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn)
    }

    fn bootstrap(conn: Connection) -> Result<SqliteLocalStore, LocalStoreError> {
        let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if found > SCHEMA_VERSION {
            return Err(LocalStoreError::UnsupportedSchemaVersion {
                found,
                supported: SCHEMA_VERSION,
            });
        }
        conn.execute_batch(SCHEMA_SQL)?;
        conn.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
        info!("event=local_store_open module=backend status=ok schema_version={SCHEMA_VERSION}");
        Ok(SqliteLocalStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl LocalStore for SqliteLocalStore {
    fn get(&self, key: &str) -> Option<String> {
        let conn = self.lock();
        let result = conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional();
        match result {
            Ok(value) => value,
            Err(err) => {
                error!("event=local_store_get module=backend status=error key={key} error={err}");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        let conn = self.lock();
        let result = conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value;",
            params![key, value],
        );
        if let Err(err) = result {
            error!("event=local_store_set module=backend status=error key={key} error={err}");
        }
    }

    fn remove(&self, key: &str) {
        let conn = self.lock();
        let result = conn.execute("DELETE FROM kv_entries WHERE key = ?1;", params![key]);
        if let Err(err) = result {
            error!("event=local_store_remove module=backend status=error key={key} error={err}");
        }
    }
}

/// Map-backed local store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryLocalStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryLocalStore {
    pub fn new() -> MemoryLocalStore {
        MemoryLocalStore::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl LocalStore for MemoryLocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.lock().remove(key);
    }
}
