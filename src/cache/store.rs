//! Transactional get-or-fetch store backed by redb
//!
//! Every lookup runs inside its own write transaction. A hit returns without
//! writing anything; a miss (or an explicit bypass) calls the fetcher while the
//! transaction is open and commits the result, so a failed fetch never leaves
//! a partial entry behind.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use redb::backends::InMemoryBackend;
use redb::{
    CommitError, Database, DatabaseError, ReadableTable, ReadableTableMetadata, StorageError,
    TableDefinition, TableError, TransactionError, WriteTransaction,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::CacheKey;
use crate::data::{FetchError, Fetcher, RowSet};

/// The single table holding every cache entry (JSON-encoded `RowSet` values)
const CACHE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("cache");

/// Errors that can occur while reading or populating the cache
#[derive(Debug, Error)]
pub enum CacheError {
    /// The directory holding the cache file could not be created
    #[error("Failed to create cache directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The store file could not be opened or created
    #[error("Failed to open cache store at {location}: {source}")]
    Open {
        location: String,
        source: DatabaseError,
    },

    #[error("Cache transaction failed: {0}")]
    Transaction(#[from] TransactionError),

    #[error("Cache table unavailable: {0}")]
    Table(#[from] TableError),

    #[error("Cache storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to commit cache entry: {0}")]
    Commit(#[from] CommitError),

    /// A stored entry could not be decoded; refetch with the cache bypassed to replace it
    #[error("Malformed cache entry {key}: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },

    #[error("Failed to serialize rows for {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    /// The fetcher failed; nothing was written
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Cache of per-day rows in front of a `Fetcher`
///
/// Owns the database handle for its whole lifetime; dropping the store closes
/// the file. Overlapping `get_or_fetch` calls on one store wait their turn on
/// an async lock before opening a write transaction, so a later caller sees
/// the entry an earlier one committed. Separate processes sharing the file, or
/// bypassing callers, can still fetch the same key twice.
pub struct CacheStore<F> {
    db: Database,
    fetcher: F,
    /// Taken before `begin_write` and held until commit or abort
    write_lock: Mutex<()>,
}

impl<F: Fetcher> CacheStore<F> {
    /// Wraps an already opened database
    pub fn new(db: Database, fetcher: F) -> Self {
        Self {
            db,
            fetcher,
            write_lock: Mutex::new(()),
        }
    }

    /// Opens (or creates) the store file at `path`, creating parent directories as needed
    pub fn open(path: &Path, fetcher: F) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| CacheError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let db = Database::create(path).map_err(|source| CacheError::Open {
            location: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "Opened cache store");

        Ok(Self::new(db, fetcher))
    }

    /// Creates a store that lives only in memory
    pub fn in_memory(fetcher: F) -> Result<Self, CacheError> {
        let db = Database::builder()
            .create_with_backend(InMemoryBackend::new())
            .map_err(|source| CacheError::Open {
                location: "memory".to_string(),
                source,
            })?;

        Ok(Self::new(db, fetcher))
    }

    /// Returns the rows for a day at a location, fetching and storing them on a miss
    ///
    /// # Arguments
    /// * `date` - Calendar day to look up
    /// * `location_id` - Location identifier of the lunar calendar site
    /// * `bypass` - Skip the lookup and refetch, replacing any stored entry
    ///
    /// # Returns
    /// * `Ok(RowSet)` - Cached or freshly fetched rows (possibly empty)
    /// * `Err(CacheError)` - Fetch, decode or storage failure, passed through unchanged
    ///
    /// # Behavior
    /// - Runs in a single write transaction, creating the `cache` table if absent
    /// - A hit aborts the transaction without writing
    /// - A failed fetch or serialization aborts; the stored entry is untouched
    /// - A malformed entry is an error and is not fetched over unless bypassing
    pub async fn get_or_fetch(
        &self,
        date: NaiveDate,
        location_id: i64,
        bypass: bool,
    ) -> Result<RowSet, CacheError> {
        let key = CacheKey::new(date, location_id);
        let _write_guard = self.write_lock.lock().await;
        let txn = self.db.begin_write()?;

        let cached = match lookup(&txn, &key, bypass) {
            Ok(cached) => cached,
            Err(err) => return Err(discard(txn, err)),
        };

        if let Some(rows) = cached {
            debug!(%key, rows = rows.len(), "Cache hit");
            txn.abort()?;
            return Ok(rows);
        }

        if bypass {
            debug!(%key, "Cache bypassed");
        } else {
            debug!(%key, "Cache miss");
        }

        let rows = match self.fetcher.fetch(date, location_id).await {
            Ok(rows) => rows,
            Err(err) => return Err(discard(txn, err.into())),
        };

        let value = match serde_json::to_vec(&rows) {
            Ok(value) => value,
            Err(source) => {
                let err = CacheError::Serialize {
                    key: key.to_string(),
                    source,
                };
                return Err(discard(txn, err));
            }
        };

        {
            let mut table = txn.open_table(CACHE_TABLE)?;
            table.insert(key.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        debug!(%key, rows = rows.len(), "Cache entry written");

        Ok(rows)
    }

    /// Number of stored entries (zero when the table has never been created)
    pub fn entry_count(&self) -> Result<u64, CacheError> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(CACHE_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(0),
            Err(err) => return Err(err.into()),
        };
        Ok(table.len()?)
    }

    /// Writes raw bytes under a key, bypassing serialization
    #[cfg(test)]
    fn put_raw(&self, key: &CacheKey, value: &[u8]) -> Result<(), CacheError> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(CACHE_TABLE)?;
            table.insert(key.as_str(), value)?;
        }
        txn.commit()?;
        Ok(())
    }
}

/// Ensures the table exists and, unless bypassing, reads and decodes the entry
fn lookup(
    txn: &WriteTransaction,
    key: &CacheKey,
    bypass: bool,
) -> Result<Option<RowSet>, CacheError> {
    let table = txn.open_table(CACHE_TABLE)?;
    if bypass {
        return Ok(None);
    }

    let Some(raw) = table.get(key.as_str())? else {
        return Ok(None);
    };

    let rows = serde_json::from_slice(raw.value()).map_err(|source| CacheError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    Ok(Some(rows))
}

/// Aborts the transaction and hands back the error that caused it
fn discard(txn: WriteTransaction, err: CacheError) -> CacheError {
    if let Err(abort_err) = txn.abort() {
        warn!(error = %abort_err, "Failed to abort cache transaction");
    }
    err
}
