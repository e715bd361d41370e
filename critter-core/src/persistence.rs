//! Persistence for the memory collection.
//!
//! The whole collection is serialised to one JSON blob and stored under a
//! fixed key. Backends only move bytes; encoding lives here:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS kv_store (
//!     key        TEXT PRIMARY KEY,
//!     data       BLOB NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     checksum   TEXT
//! );
//! ```
//!
//! - Records are a JSON array of kind-tagged flat objects. Each element is
//!   decoded on its own, so an unknown or damaged record is skipped without
//!   losing the rest.
//! - An optional CRC-32 detects save corruption; a mismatch is logged and the
//!   data is still used.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags, params};
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::error::{CritterError, Result};
use crate::memory::MemoryRecord;

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialise a record collection.
///
/// # Errors
///
/// Returns [`CritterError::Serialization`] if JSON encoding fails.
pub fn encode_records(records: &[MemoryRecord]) -> Result<Vec<u8>> {
    serde_json::to_vec(records).map_err(|e| CritterError::Serialization(e.to_string()))
}

/// Deserialise a record collection, skipping elements that don't decode.
///
/// # Errors
///
/// Returns [`CritterError::Serialization`] if the blob is not a JSON array.
pub fn decode_records(data: &[u8]) -> Result<Vec<MemoryRecord>> {
    let raw: Vec<serde_json::Value> =
        serde_json::from_slice(data).map_err(|e| CritterError::Serialization(e.to_string()))?;

    let total = raw.len();
    let records: Vec<MemoryRecord> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<MemoryRecord>(value) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "Skipping undecodable memory record");
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(
            skipped = total - records.len(),
            kept = records.len(),
            "Some stored memory records were skipped"
        );
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Durable key-value storage for the memory blob.
pub trait MemoryBackend: Send {
    /// Read the blob stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Backend-specific storage errors.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the blob stored under `key`.
    ///
    /// # Errors
    ///
    /// Backend-specific storage errors.
    fn save(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Remove the blob under `key`. Returns `true` if something was removed.
    ///
    /// # Errors
    ///
    /// Backend-specific storage errors.
    fn clear(&self, key: &str) -> Result<bool>;
}

// ---------------------------------------------------------------------------
// In-memory backend
// ---------------------------------------------------------------------------

/// Process-local backend. Clones share the same storage, which lets tests
/// reopen a store against what a previous one saved.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `key` with raw bytes.
    pub fn insert_raw(&self, key: &str, data: impl Into<Vec<u8>>) {
        self.blobs.lock().insert(key.to_string(), data.into());
    }

    /// Raw bytes under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.blobs.lock().get(key).cloned()
    }
}

impl MemoryBackend for InMemoryBackend {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.raw(key))
    }

    fn save(&self, key: &str, data: &[u8]) -> Result<()> {
        self.insert_raw(key, data);
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<bool> {
        Ok(self.blobs.lock().remove(key).is_some())
    }
}

// ---------------------------------------------------------------------------
// Blob checksum
// ---------------------------------------------------------------------------

/// Reflected CRC-32 lookup table (polynomial `0xEDB88320`).
const CRC_TABLE: [u32; 256] = crc_table();

#[allow(clippy::cast_possible_truncation)]
const fn crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = i as u32;
        let mut bit = 0;
        while bit < 8 {
            c = if c & 1 == 1 { 0xEDB8_8320 ^ (c >> 1) } else { c >> 1 };
            bit += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

/// CRC-32 of a stored blob as eight lowercase hex digits.
fn blob_checksum(data: &[u8]) -> String {
    let crc = data.iter().fold(u32::MAX, |crc, &byte| {
        CRC_TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize] ^ (crc >> 8)
    });
    format!("{:08x}", !crc)
}

// ---------------------------------------------------------------------------
// SQLite backend
// ---------------------------------------------------------------------------

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key        TEXT PRIMARY KEY,
    data       BLOB NOT NULL,
    updated_at TEXT NOT NULL,
    checksum   TEXT
);";

/// SQLite-backed key-value storage.
///
/// ```no_run
/// # use critter_core::persistence::{MemoryBackend, SqliteBackend};
/// # use critter_core::config::PersistenceConfig;
/// let backend = SqliteBackend::open("critter.db", &PersistenceConfig::default())?;
/// backend.save("pet.memories.v1", b"[]")?;
/// assert!(backend.load("pet.memories.v1")?.is_some());
/// # Ok::<(), critter_core::error::CritterError>(())
/// ```
pub struct SqliteBackend {
    conn: Connection,
    checksum_enabled: bool,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("db_path", &self.db_path)
            .field("checksum_enabled", &self.checksum_enabled)
            .finish_non_exhaustive()
    }
}

impl SqliteBackend {
    /// Open (or create) a database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CritterError::Database`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "Critter storage opened"
        );

        Ok(Self {
            conn,
            checksum_enabled: config.checksum_enabled,
            db_path,
        })
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`CritterError::Database`] on SQLite failures.
    pub fn open_in_memory(config: &PersistenceConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            checksum_enabled: config.checksum_enabled,
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Run SQLite's integrity check.
    ///
    /// # Errors
    ///
    /// Returns [`CritterError::Database`] if the check itself fails.
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }
}

impl MemoryBackend for SqliteBackend {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT data, checksum FROM kv_store WHERE key = ?1")?;

        let row: Option<(Vec<u8>, Option<String>)> = match stmt
            .query_row(params![key], |row| Ok((row.get(0)?, row.get(1)?)))
        {
            Ok(found) => Some(found),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        let Some((data, stored_checksum)) = row else {
            return Ok(None);
        };

        if self.checksum_enabled {
            if let Some(expected) = stored_checksum {
                let actual = blob_checksum(&data);
                if expected != actual {
                    warn!(
                        key,
                        expected = %expected,
                        actual = %actual,
                        "Checksum mismatch, possible save corruption"
                    );
                }
            }
        }

        Ok(Some(data))
    }

    fn save(&self, key: &str, data: &[u8]) -> Result<()> {
        let start = Instant::now();
        let checksum = self.checksum_enabled.then(|| blob_checksum(data));
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO kv_store (key, data, updated_at, checksum)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at,
                checksum = excluded.checksum",
            params![key, data, now, checksum],
        )?;

        debug!(
            key,
            bytes = data.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Saved blob"
        );
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
