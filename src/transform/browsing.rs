//! Browsing record transformer

use chrono::{TimeZone, Utc};
use tracing::debug;

use super::classify::determine_browsing_type;
use crate::error::{RefinerError, RefinerResult};
use crate::models::{
    Author, Entry, RawBrowsingEntry, RawBrowsingRecord, RefinedRecord, Stats, parse_timestamp,
};

/// Mean time spent, `0.0` for an empty slice
pub fn average_time_spent(time_spent: &[i64]) -> f64 {
    if time_spent.is_empty() {
        return 0.0;
    }
    let total: i128 = time_spent.iter().map(|&t| i128::from(t)).sum();
    total as f64 / time_spent.len() as f64
}

/// Normalizes raw browsing exports into Author, Entry and Stats rows
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowsingTransformer;

impl BrowsingTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Transform one raw record
    ///
    /// Fails with [`RefinerError::Validation`] when the author id is empty
    /// or a timestamp is outside the representable range.
    pub fn transform(&self, record: &RawBrowsingRecord) -> RefinerResult<RefinedRecord> {
        let author_id = record.author.as_str();
        if author_id.is_empty() {
            return Err(RefinerError::Validation(
                "author id must not be empty".to_string(),
            ));
        }

        let created_time = parse_timestamp(record.created_time).ok_or_else(|| {
            RefinerError::Validation(format!(
                "created_time {} is out of range",
                record.created_time
            ))
        })?;

        let entries = record
            .entries()
            .iter()
            .map(|raw| Self::entry(author_id, raw))
            .collect::<RefinerResult<Vec<_>>>()?;

        let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();
        let time_spent: Vec<i64> = entries.iter().map(|e| e.time_spent).collect();

        let stats = Stats {
            author_id: author_id.to_string(),
            url_count: entries.len(),
            average_time_spent: average_time_spent(&time_spent),
            browsing_type: determine_browsing_type(&urls),
        };

        debug!(
            "Transformed record for {}: {} entries, type {}",
            author_id, stats.url_count, stats.browsing_type
        );

        Ok(RefinedRecord {
            author: Author {
                author_id: author_id.to_string(),
                created_time,
            },
            entries,
            stats,
        })
    }

    fn entry(author_id: &str, raw: &RawBrowsingEntry) -> RefinerResult<Entry> {
        // entry timestamps are always epoch milliseconds
        let timestamp = Utc.timestamp_millis_opt(raw.timestamp).single().ok_or_else(|| {
            RefinerError::Validation(format!(
                "timestamp {} of {} is out of range",
                raw.timestamp, raw.url
            ))
        })?;

        Ok(Entry {
            entry_id: None,
            author_id: author_id.to_string(),
            url: raw.url.clone(),
            time_spent: raw.time_spent,
            timestamp,
        })
    }
}
