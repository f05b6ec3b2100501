//! Normalized rows persisted in the refined store

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Integers at or above this magnitude are read as epoch milliseconds
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Convert an epoch timestamp in seconds or milliseconds to UTC
///
/// Used for `created_time`, which exports write in either unit. Entry
/// timestamps are always milliseconds and do not go through this.
/// Returns `None` when the value is out of chrono's range.
pub fn parse_timestamp(value: i64) -> Option<DateTime<Utc>> {
    if value.unsigned_abs() >= MILLIS_THRESHOLD as u64 {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    }
}

/// Browsing category derived from the most visited site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrowsingType {
    Shopping,
    #[serde(rename = "Social Media")]
    SocialMedia,
    News,
    General,
    Unknown,
}

impl BrowsingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowsingType::Shopping => "Shopping",
            BrowsingType::SocialMedia => "Social Media",
            BrowsingType::News => "News",
            BrowsingType::General => "General",
            BrowsingType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for BrowsingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BrowsingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Shopping" => Ok(BrowsingType::Shopping),
            "Social Media" => Ok(BrowsingType::SocialMedia),
            "News" => Ok(BrowsingType::News),
            "General" => Ok(BrowsingType::General),
            "Unknown" => Ok(BrowsingType::Unknown),
            _ => Err(format!("Unknown browsing type: {}", s)),
        }
    }
}

/// Owner of a browsing export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    /// Non-empty primary key
    pub author_id: String,
    pub created_time: DateTime<Utc>,
}

/// A visited URL, keyed to its author
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Assigned by the store on insert
    pub entry_id: Option<i64>,
    pub author_id: String,
    pub url: String,
    /// Seconds spent on the page
    pub time_spent: i64,
    pub timestamp: DateTime<Utc>,
}

/// Aggregates over one author's entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub author_id: String,
    pub url_count: usize,
    /// Mean of `time_spent`, `0.0` when there are no entries
    pub average_time_spent: f64,
    pub browsing_type: BrowsingType,
}

/// Everything derived from one raw record
#[derive(Debug, Clone, PartialEq)]
pub struct RefinedRecord {
    pub author: Author,
    pub entries: Vec<Entry>,
    pub stats: Stats,
}
