//! Refined store
//!
//! This module provides the persistence sink for normalized browsing rows:
//! - [`RefinedStore`]: repository interface with lookup-by-id
//! - [`SqliteStore`]: SQLite implementation backed by a single file
//!
//! A store holds the rows of exactly one record. Rows are keyed by
//! explicit foreign ids; there is no object graph to traverse.

pub mod schema;
pub mod sqlite;

pub use schema::DatabaseSchema;
pub use sqlite::SqliteStore;

use crate::models::{Author, Entry, RefinedRecord, Stats};

/// Error type for database operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Failed to open or create the database
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema creation failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Transaction failed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// The store already holds an author
    #[error("Store already holds author '{0}'; one author per refined store")]
    AuthorAlreadyPersisted(String),

    /// A stored value could not be mapped back to the model
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
}

/// Result type for database operations
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Repository interface over the refined rows
pub trait RefinedStore {
    /// Write one author with its entries and stats atomically
    ///
    /// Fails with [`DatabaseError::AuthorAlreadyPersisted`] if the store
    /// already holds an author.
    fn persist(&mut self, record: &RefinedRecord) -> DatabaseResult<()>;

    /// Look up an author by id
    fn author(&self, author_id: &str) -> DatabaseResult<Option<Author>>;

    /// Number of stored authors (0 or 1)
    fn author_count(&self) -> DatabaseResult<usize>;

    /// The stats row, if any
    fn stats(&self) -> DatabaseResult<Option<Stats>>;

    /// All entries in insertion order
    fn entries(&self) -> DatabaseResult<Vec<Entry>>;

    /// Entries of one author in insertion order
    fn entries_for_author(&self, author_id: &str) -> DatabaseResult<Vec<Entry>>;
}
