//! Trial store: an explicit, process-wide SQLite context.
//!
//! The store is constructed exactly once at process start and passed by
//! reference to every query; there is no global connection and no lazy
//! hidden initialization. Ingestion happens at open time when the database
//! file is absent, never afterwards; from the query layer's perspective the
//! store is read-only.

pub mod ingest;
pub mod schema;

use crate::error::{CohortError, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

pub use ingest::{init_and_load, IngestSummary, POPULATIONS};

/// Read-only handle to the trial database plus a generation counter.
///
/// The generation increments on every (re-)ingestion and is part of every
/// memoization key, so a fresh load invalidates all cached tables at once.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
    generation: u64,
}

impl Store {
    /// Open an existing store file, read-only.
    ///
    /// Fails with [`CohortError::StoreUnavailable`] if the file is absent;
    /// use [`Store::open_or_init`] to bootstrap from a source CSV instead.
    pub fn open(db: &Path) -> Result<Self> {
        if !db.exists() {
            return Err(CohortError::StoreUnavailable { db: db.to_path_buf() });
        }
        let conn = Connection::open_with_flags(
            db,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn, generation: 0 })
    }

    /// Open the store, ingesting `source` first if the database is missing.
    ///
    /// An ingestion failure here is fatal to the caller; there is no
    /// degraded or partially-loaded mode.
    pub fn open_or_init(db: &Path, source: &Path) -> Result<(Self, Option<IngestSummary>)> {
        if db.exists() {
            return Ok((Self::open(db)?, None));
        }
        let mut conn = Connection::open(db)?;
        let summary = ingest::init_and_load(&mut conn, source)?;
        Ok((Self { conn, generation: 0 }, Some(summary)))
    }

    /// Build an in-memory store from a source CSV. Test and demo entry point.
    pub fn in_memory(source: &Path) -> Result<(Self, IngestSummary)> {
        let mut conn = Connection::open_in_memory()?;
        let summary = ingest::init_and_load(&mut conn, source)?;
        Ok((Self { conn, generation: 0 }, summary))
    }

    /// Drop all loaded data and re-ingest `source`, bumping the generation.
    pub fn reload(&mut self, source: &Path) -> Result<IngestSummary> {
        self.conn.execute_batch(
            "DROP TABLE IF EXISTS samples;
             DROP TABLE IF EXISTS subjects;",
        )?;
        let summary = ingest::init_and_load(&mut self.conn, source)?;
        self.generation += 1;
        Ok(summary)
    }

    /// Current store generation; part of every memoization key.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Raw connection for the query layer.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
