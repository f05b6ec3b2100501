//! SQLite database backend implementation
//!
//! Provides the file-backed refined store that is later encrypted and
//! published. Supports in-memory mode for tests.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};

use super::schema::{DatabaseSchema, author_sql, entry_sql, stats_sql};
use super::{DatabaseError, DatabaseResult, RefinedStore};
use crate::models::{Author, BrowsingType, Entry, RefinedRecord, Stats};

/// SQLite refined store
pub struct SqliteStore {
    /// Path to the database file (None for in-memory)
    db_path: Option<PathBuf>,
    connection: Connection,
}

fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_datetime(value: &str) -> DatabaseResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::InvalidData(format!("invalid datetime '{}': {}", value, e)))
}

fn to_i64(value: usize) -> DatabaseResult<i64> {
    i64::try_from(value)
        .map_err(|_| DatabaseError::InvalidData(format!("value {} exceeds INTEGER range", value)))
}

fn to_usize(value: i64) -> DatabaseResult<usize> {
    usize::try_from(value)
        .map_err(|_| DatabaseError::InvalidData(format!("value {} is negative", value)))
}

fn query_failed(e: rusqlite::Error) -> DatabaseError {
    DatabaseError::QueryFailed(e.to_string())
}

/// Entry columns as stored, before datetime conversion
type EntryRow = (i64, String, String, i64, String);

fn entry_from_row(row: EntryRow) -> DatabaseResult<Entry> {
    let (entry_id, author_id, url, time_spent, timestamp) = row;
    Ok(Entry {
        entry_id: Some(entry_id),
        author_id,
        url,
        time_spent,
        timestamp: parse_datetime(&timestamp)?,
    })
}

impl SqliteStore {
    /// Create a fresh store at `db_path`
    ///
    /// Any existing file at the path is removed first: a refined store
    /// never accumulates rows across runs.
    pub fn create(db_path: impl AsRef<Path>) -> DatabaseResult<Self> {
        let path = db_path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::IoError(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        if path.exists() {
            debug!("Removing previous store at {}", path.display());
            std::fs::remove_file(&path).map_err(|e| {
                DatabaseError::IoError(format!(
                    "Failed to remove previous store {}: {}",
                    path.display(),
                    e
                ))
            })?;
        }

        let store = Self::open(&path)?;
        store.initialize()?;
        info!("Created refined store at {}", path.display());
        Ok(store)
    }

    /// Open an existing store file without resetting it
    pub fn open(db_path: impl AsRef<Path>) -> DatabaseResult<Self> {
        let path = db_path.as_ref().to_path_buf();
        let connection = Connection::open(&path).map_err(|e| {
            DatabaseError::ConnectionFailed(format!(
                "Failed to open SQLite database {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::enable_foreign_keys(&connection)?;

        Ok(Self {
            db_path: Some(path),
            connection,
        })
    }

    /// Create an initialized in-memory store
    pub fn in_memory() -> DatabaseResult<Self> {
        let connection = Connection::open_in_memory().map_err(|e| {
            DatabaseError::ConnectionFailed(format!("Failed to create in-memory SQLite: {}", e))
        })?;
        Self::enable_foreign_keys(&connection)?;

        let store = Self {
            db_path: None,
            connection,
        };
        store.initialize()?;
        Ok(store)
    }

    fn enable_foreign_keys(connection: &Connection) -> DatabaseResult<()> {
        connection
            .pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| {
                DatabaseError::ConnectionFailed(format!("Failed to enable foreign keys: {}", e))
            })
    }

    /// Create tables and indexes if they don't exist
    pub fn initialize(&self) -> DatabaseResult<()> {
        self.connection
            .execute_batch(DatabaseSchema::create_tables_sql())
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        self.connection
            .execute_batch(DatabaseSchema::create_indexes_sql())
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Get the database file path (None for in-memory)
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Raw connection, for schema inspection
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Close the connection, flushing everything to disk
    pub fn close(self) -> DatabaseResult<()> {
        self.connection
            .close()
            .map_err(|(_, e)| DatabaseError::ConnectionFailed(format!("Close failed: {}", e)))
    }

    /// Close the store and move its file over `target`, reopening it there
    ///
    /// The rename replaces `target` in one step, so a reader of `target`
    /// sees either the old store or the new one.
    pub fn promote(self, target: impl AsRef<Path>) -> DatabaseResult<Self> {
        let target = target.as_ref();
        let Some(source) = self.db_path.clone() else {
            return Err(DatabaseError::InvalidData(
                "an in-memory store cannot be promoted".to_string(),
            ));
        };
        self.close()?;

        std::fs::rename(&source, target).map_err(|e| {
            DatabaseError::IoError(format!(
                "Failed to move {} to {}: {}",
                source.display(),
                target.display(),
                e
            ))
        })?;
        debug!("Promoted {} to {}", source.display(), target.display());
        Self::open(target)
    }
}

impl RefinedStore for SqliteStore {
    fn persist(&mut self, record: &RefinedRecord) -> DatabaseResult<()> {
        let tx = self
            .connection
            .transaction()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        let existing: Option<String> = tx
            .query_row("SELECT author_id FROM authors LIMIT 1", [], |row| row.get(0))
            .optional()
            .map_err(query_failed)?;
        if let Some(existing) = existing {
            return Err(DatabaseError::AuthorAlreadyPersisted(existing));
        }

        let author = &record.author;
        tx.execute(
            author_sql::INSERT,
            params![author.author_id, format_datetime(&author.created_time)],
        )
        .map_err(query_failed)?;

        {
            let mut stmt = tx.prepare(entry_sql::INSERT).map_err(query_failed)?;
            for entry in &record.entries {
                stmt.execute(params![
                    entry.author_id,
                    entry.url,
                    entry.time_spent,
                    format_datetime(&entry.timestamp)
                ])
                .map_err(query_failed)?;
            }
        }

        let stats = &record.stats;
        tx.execute(
            stats_sql::INSERT,
            params![
                stats.author_id,
                to_i64(stats.url_count)?,
                stats.average_time_spent,
                stats.browsing_type.as_str()
            ],
        )
        .map_err(query_failed)?;

        // Dropping the transaction on any early return rolls it back
        tx.commit()
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        debug!(
            "Persisted author {} with {} entries",
            author.author_id,
            record.entries.len()
        );
        Ok(())
    }

    fn author(&self, author_id: &str) -> DatabaseResult<Option<Author>> {
        let row: Option<(String, String)> = self
            .connection
            .query_row(author_sql::SELECT_BY_ID, params![author_id], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .map_err(query_failed)?;

        row.map(|(author_id, created_time)| {
            Ok(Author {
                author_id,
                created_time: parse_datetime(&created_time)?,
            })
        })
        .transpose()
    }

    fn author_count(&self) -> DatabaseResult<usize> {
        let count: i64 = self
            .connection
            .query_row(author_sql::COUNT, [], |row| row.get(0))
            .map_err(query_failed)?;
        to_usize(count)
    }

    fn stats(&self) -> DatabaseResult<Option<Stats>> {
        let row: Option<(String, i64, f64, String)> = self
            .connection
            .query_row(stats_sql::SELECT_FIRST, [], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .optional()
            .map_err(query_failed)?;

        row.map(|(author_id, url_count, average_time_spent, browsing_type)| {
            Ok(Stats {
                author_id,
                url_count: to_usize(url_count)?,
                average_time_spent,
                browsing_type: browsing_type
                    .parse::<BrowsingType>()
                    .map_err(DatabaseError::InvalidData)?,
            })
        })
        .transpose()
    }

    fn entries(&self) -> DatabaseResult<Vec<Entry>> {
        let mut stmt = self
            .connection
            .prepare(entry_sql::SELECT_ALL)
            .map_err(query_failed)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })
            .map_err(query_failed)?
            .collect::<Result<Vec<EntryRow>, _>>()
            .map_err(query_failed)?;

        rows.into_iter().map(entry_from_row).collect()
    }

    fn entries_for_author(&self, author_id: &str) -> DatabaseResult<Vec<Entry>> {
        let mut stmt = self
            .connection
            .prepare(entry_sql::SELECT_BY_AUTHOR)
            .map_err(query_failed)?;
        let rows = stmt
            .query_map(params![author_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            })
            .map_err(query_failed)?
            .collect::<Result<Vec<EntryRow>, _>>()
            .map_err(query_failed)?;

        rows.into_iter().map(entry_from_row).collect()
    }
}
