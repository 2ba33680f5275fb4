pub mod error;
pub mod migrations;
pub mod models;
pub mod queries;

pub use error::StoreError;

use anyhow::Result;
use rusqlite::{Connection, OpenFlags, Transaction, TransactionBehavior};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::info;

const READER_POOL_SIZE: usize = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite handle with a reader/writer split.
///
/// All writes go through a single connection; reads rotate over a small pool
/// of read-only connections so a long fetch never waits on an insert. An
/// in-memory database has no pool and reads share the writer.
pub struct Database {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    reader_idx: AtomicUsize,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let writer = Connection::open(path)?;

        // WAL mode for concurrent reads
        writer.pragma_update(None, "journal_mode", "WAL")?;
        writer.pragma_update(None, "foreign_keys", "ON")?;
        writer.busy_timeout(BUSY_TIMEOUT)?;

        migrations::run(&writer)?;

        let mut readers = Vec::with_capacity(READER_POOL_SIZE);
        for _ in 0..READER_POOL_SIZE {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            readers.push(Mutex::new(conn));
        }

        info!(
            "Database opened at {} (1 writer + {} readers)",
            path.display(),
            READER_POOL_SIZE
        );
        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            reader_idx: AtomicUsize::new(0),
        })
    }

    /// Private in-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;

        Ok(Self {
            writer: Mutex::new(conn),
            readers: Vec::new(),
            reader_idx: AtomicUsize::new(0),
        })
    }

    /// Runs `f` inside an IMMEDIATE transaction on the writer.
    ///
    /// Commits when `f` returns `Ok`. Any error, including an early `?`
    /// inside `f`, drops the transaction and rolls everything back.
    pub fn write<F, T>(&self, f: F) -> std::result::Result<T, StoreError>
    where
        F: FnOnce(&Transaction<'_>) -> std::result::Result<T, StoreError>,
    {
        let mut conn = self.writer.lock().map_err(|_| StoreError::LockPoisoned)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    /// Runs `f` inside a deferred (read) transaction so it sees one snapshot.
    pub fn read<F, T>(&self, f: F) -> std::result::Result<T, StoreError>
    where
        F: FnOnce(&Transaction<'_>) -> std::result::Result<T, StoreError>,
    {
        let mut conn = self.reader()?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn reader(&self) -> std::result::Result<MutexGuard<'_, Connection>, StoreError> {
        if self.readers.is_empty() {
            return self.writer.lock().map_err(|_| StoreError::LockPoisoned);
        }
        let idx = self.reader_idx.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        self.readers[idx].lock().map_err(|_| StoreError::LockPoisoned)
    }
}
