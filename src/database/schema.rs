//! Database schema definitions
//!
//! Canonical SQLite DDL for the refined store. The structural description
//! published alongside the store lives in [`crate::schema`] and is checked
//! against these statements in tests.

/// Database schema helper
pub struct DatabaseSchema;

impl DatabaseSchema {
    /// Get the schema creation SQL
    pub fn create_tables_sql() -> &'static str {
        r#"
-- One author per refined store
CREATE TABLE IF NOT EXISTS authors (
    author_id TEXT PRIMARY KEY NOT NULL,
    created_time DATETIME NOT NULL
);

-- Visited URLs, in insertion order
CREATE TABLE IF NOT EXISTS entries (
    entry_id INTEGER PRIMARY KEY AUTOINCREMENT,
    author_id TEXT NOT NULL REFERENCES authors(author_id),
    url TEXT NOT NULL,
    time_spent INTEGER NOT NULL,
    timestamp DATETIME NOT NULL
);

-- Aggregates, one row per author
CREATE TABLE IF NOT EXISTS stats (
    stats_id INTEGER PRIMARY KEY AUTOINCREMENT,
    author_id TEXT NOT NULL UNIQUE REFERENCES authors(author_id),
    url_count INTEGER NOT NULL,
    average_time_spent REAL NOT NULL,
    browsing_type TEXT NOT NULL
);
"#
    }

    /// Get index creation SQL
    pub fn create_indexes_sql() -> &'static str {
        "CREATE INDEX IF NOT EXISTS idx_entries_author ON entries(author_id);"
    }
}

/// SQL for authors
pub mod author_sql {
    pub const INSERT: &str = "INSERT INTO authors (author_id, created_time) VALUES (?1, ?2)";
    pub const SELECT_BY_ID: &str =
        "SELECT author_id, created_time FROM authors WHERE author_id = ?1";
    pub const COUNT: &str = "SELECT COUNT(*) FROM authors";
}

/// SQL for entries
pub mod entry_sql {
    pub const INSERT: &str = r#"
INSERT INTO entries (author_id, url, time_spent, timestamp)
VALUES (?1, ?2, ?3, ?4)
"#;
    pub const SELECT_ALL: &str =
        "SELECT entry_id, author_id, url, time_spent, timestamp FROM entries ORDER BY entry_id";
    pub const SELECT_BY_AUTHOR: &str = r#"
SELECT entry_id, author_id, url, time_spent, timestamp FROM entries
WHERE author_id = ?1
ORDER BY entry_id
"#;
}

/// SQL for stats
pub mod stats_sql {
    pub const INSERT: &str = r#"
INSERT INTO stats (author_id, url_count, average_time_spent, browsing_type)
VALUES (?1, ?2, ?3, ?4)
"#;
    pub const SELECT_FIRST: &str = r#"
SELECT author_id, url_count, average_time_spent, browsing_type FROM stats
ORDER BY stats_id
LIMIT 1
"#;
}
