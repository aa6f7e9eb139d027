//! Trackwarden Storage Layer
//!
//! Implements the `TrackbackStore` and `ArticleStore` traits.
//!
//! # Architecture
//!
//! - SQLite for trackbacks and the articles they point at
//! - GUID uniqueness enforced by the primary key, surfaced as `DuplicateGuid`
//! - An in-memory store with the same contract for tests and dry runs
//!
//! # Examples
//!
//! ```no_run
//! use trackwarden_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for trackback operations
//! ```

#![warn(missing_docs)]

mod memory;

pub use memory::MemoryStore;

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use trackwarden_domain::traits::{ArticleStore, PersistError, TrackbackStore};
use trackwarden_domain::{ArticleId, Guid, SpamVerdict, TrackbackRecord};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A record with this GUID already exists
    #[error("Duplicate GUID: {0}")]
    DuplicateGuid(Guid),

    /// Record cannot be stored as-is
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<StoreError> for PersistError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateGuid(guid) => PersistError::DuplicateGuid(guid),
            other => PersistError::Storage(other.to_string()),
        }
    }
}

/// SQLite-based implementation of TrackbackStore and ArticleStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Register an article so trackbacks can resolve it
    pub fn register_article(&mut self, id: &ArticleId, title: Option<&str>) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO articles (id, title, created_at) VALUES (?1, ?2, strftime('%s','now'))
             ON CONFLICT(id) DO UPDATE SET title = excluded.title",
            params![id.as_str(), title],
        )?;
        Ok(())
    }

    /// Insert a finalized record
    pub fn insert(&mut self, record: &TrackbackRecord) -> Result<(), StoreError> {
        let guid = record
            .guid()
            .ok_or_else(|| StoreError::InvalidData("record has no GUID".to_string()))?;

        let result = self.conn.execute(
            "INSERT INTO trackbacks (guid, article_id, blog_name, title, url, excerpt, ip, spam_verdict, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                guid_to_bytes(guid),
                record.article_id.as_str(),
                record.blog_name,
                record.title,
                record.url,
                record.excerpt,
                record.ip,
                record.spam_verdict().as_str(),
                record.created_at as i64,
            ],
        );

        result.map(|_| ()).map_err(|e| insert_error(guid, e))
    }

    /// Get a record by GUID
    pub fn get(&self, guid: Guid) -> Result<Option<TrackbackRecord>, StoreError> {
        let record = self
            .conn
            .query_row(
                "SELECT guid, article_id, blog_name, title, url, excerpt, ip, spam_verdict, created_at
                 FROM trackbacks WHERE guid = ?1",
                params![guid_to_bytes(guid)],
                row_to_record,
            )
            .optional()?;

        Ok(record)
    }

    /// All records attached to an article, oldest first
    pub fn for_article(&self, id: &ArticleId) -> Result<Vec<TrackbackRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT guid, article_id, blog_name, title, url, excerpt, ip, spam_verdict, created_at
             FROM trackbacks WHERE article_id = ?1 ORDER BY created_at, rowid",
        )?;

        let records = stmt
            .query_map(params![id.as_str()], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

/// Convert a Guid to bytes for storage
/// Only a primary key clash is a GUID collision; other constraint failures
/// are storage errors
fn insert_error(guid: Guid, err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY {
            return StoreError::DuplicateGuid(guid);
        }
    }
    StoreError::Database(err)
}

fn guid_to_bytes(guid: Guid) -> Vec<u8> {
    guid.value().to_be_bytes().to_vec()
}

/// Convert bytes to a Guid
fn bytes_to_guid(bytes: &[u8]) -> Result<Guid, StoreError> {
    if bytes.len() != 16 {
        return Err(StoreError::InvalidData(format!(
            "Expected 16 bytes for Guid, got {}",
            bytes.len()
        )));
    }
    let mut arr = [0u8; 16];
    arr.copy_from_slice(bytes);
    Ok(Guid::from_value(u128::from_be_bytes(arr)))
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<TrackbackRecord> {
    let guid_bytes: Vec<u8> = row.get(0)?;
    let guid = bytes_to_guid(&guid_bytes).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Blob, Box::new(e))
    })?;

    let verdict_str: String = row.get(7)?;
    let spam_verdict = SpamVerdict::parse(&verdict_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            rusqlite::types::Type::Text,
            Box::new(StoreError::InvalidData(format!("Unknown verdict: {}", verdict_str))),
        )
    })?;

    let article_id: String = row.get(1)?;

    Ok(TrackbackRecord::restore(
        guid,
        ArticleId::new(article_id),
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        spam_verdict,
        row.get::<_, i64>(8)? as u64,
    ))
}

impl TrackbackStore for SqliteStore {
    fn save(&mut self, record: &TrackbackRecord) -> Result<(), PersistError> {
        self.insert(record)?;
        tracing::debug!("Stored trackback {:?} for article {}", record.guid(), record.article_id);
        Ok(())
    }

    fn find_by_guid(&self, guid: Guid) -> Result<Option<TrackbackRecord>, PersistError> {
        Ok(self.get(guid)?)
    }

    fn list_for_article(&self, id: &ArticleId) -> Result<Vec<TrackbackRecord>, PersistError> {
        Ok(self.for_article(id)?)
    }
}

impl ArticleStore for SqliteStore {
    type Error = StoreError;

    fn resolve_article(&self, id: &ArticleId) -> Result<bool, Self::Error> {
        let exists = self
            .conn
            .query_row(
                "SELECT 1 FROM articles WHERE id = ?1",
                params![id.as_str()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        Ok(exists)
    }
}
