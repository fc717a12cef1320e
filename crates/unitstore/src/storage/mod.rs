//! Durable key/value storage for assignment slots.
//!
//! Slots are named text documents. [`SqliteStorage`] keeps them in a
//! `SQLite` database; [`MemoryStorage`] keeps them in process memory and is
//! what callers fall back to when durable storage cannot be opened.

mod memory;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, trace, warn};

use crate::config::{Config, StorageBackend};
use crate::error::{Error, Result};

pub use memory::MemoryStorage;

/// A string key/value store holding whole documents per slot.
///
/// Writes replace the full slot value; there are no partial updates.
pub trait KeyValueStorage: std::fmt::Debug {
    /// Read a slot, returning `None` if it has never been written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the contents of a slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete a slot. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<bool>;

    /// List slot names starting with `prefix`, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Slot count and on-disk size.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn stats(&self) -> Result<SlotStats>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).keys(prefix)
    }

    fn stats(&self) -> Result<SlotStats> {
        (**self).stats()
    }
}

/// The backend a caller actually ended up with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveBackend {
    /// `SQLite` database at the given path.
    Sqlite(PathBuf),
    /// Memory, as configured.
    Memory,
    /// Memory, because the configured database could not be opened.
    MemoryFallback {
        /// The database that failed to open.
        path: PathBuf,
        /// Why it failed.
        reason: String,
    },
}

impl ActiveBackend {
    /// Whether changes made through this backend outlive the process.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        matches!(self, Self::Sqlite(_))
    }
}

impl std::fmt::Display for ActiveBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(path) => write!(f, "sqlite ({})", path.display()),
            Self::Memory => write!(f, "memory"),
            Self::MemoryFallback { path, .. } => {
                write!(f, "memory (fallback, {} unavailable)", path.display())
            }
        }
    }
}

/// Open the configured backend, degrading to memory if it is unavailable.
///
/// A failed open is logged as a warning and never returned as an error.
#[must_use]
pub fn open_or_memory(config: &Config) -> (Box<dyn KeyValueStorage>, ActiveBackend) {
    match config.storage.backend {
        StorageBackend::Memory => (Box::new(MemoryStorage::new()), ActiveBackend::Memory),
        StorageBackend::Sqlite => {
            let path = config.database_path();
            match SqliteStorage::open(&path) {
                Ok(storage) => (Box::new(storage), ActiveBackend::Sqlite(path)),
                Err(e) => {
                    warn!(
                        "Durable storage unavailable, changes will not be saved: {}",
                        e
                    );
                    let reason = e.to_string();
                    (
                        Box::new(MemoryStorage::new()),
                        ActiveBackend::MemoryFallback { path, reason },
                    )
                }
            }
        }
    }
}

/// Slot storage backed by a `SQLite` database file.
#[derive(Debug)]
pub struct SqliteStorage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl SqliteStorage {
    /// Open or create a slot database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist,
    /// then brings the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening slot database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Slot database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory database, mostly for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compute the BLAKE3 hash used to detect unchanged writes.
    #[must_use]
    pub fn content_hash(value: &str) -> String {
        blake3::hash(value.as_bytes()).to_hex().to_string()
    }

    fn stored_hash(&self, key: &str) -> Result<Option<String>> {
        let hash = self
            .conn
            .query_row(
                "SELECT content_hash FROM slots WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let hash = Self::content_hash(value);
        if self.stored_hash(key)?.as_deref() == Some(hash.as_str()) {
            trace!("Slot {} unchanged, skipping write", key);
            return Ok(());
        }

        self.conn.execute(
            r"
            INSERT INTO slots (key, value, content_hash, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                content_hash = excluded.content_hash,
                updated_at = excluded.updated_at
            ",
            params![key, value, hash, Utc::now().to_rfc3339()],
        )?;
        debug!("Wrote slot {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let affected = self.conn.execute("DELETE FROM slots WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM slots WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key")?;
        let keys = stmt
            .query_map([prefix], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn stats(&self) -> Result<SlotStats> {
        let total_slots: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM slots", [], |row| row.get(0))?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(SlotStats {
            total_slots,
            db_size_bytes,
        })
    }
}

/// Statistics about a slot backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStats {
    /// Number of slots stored.
    pub total_slots: i64,
    /// Size of the database file in bytes, 0 when nothing is on disk.
    pub db_size_bytes: u64,
}
