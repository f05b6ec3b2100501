//! Raw browsing export as found in input files

use serde::{Deserialize, Serialize};

/// A single browsing-activity export
///
/// Mirrors the on-disk JSON shape:
///
/// ```json
/// {"data":{"browsingDataArray":[{"url":"https://a.com","timeSpent":12,"timestamp":1700000000000}]},
///  "created_time":1700000000,"author":"user-1"}
/// ```
///
/// Unknown fields (`data_hash`, `random_string`, ...) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawBrowsingRecord {
    /// Author identifier
    pub author: String,
    /// Creation time of the export (epoch seconds or milliseconds)
    pub created_time: i64,
    /// Browsing payload
    pub data: RawBrowsingData,
}

/// Payload wrapper holding the browsing entries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RawBrowsingData {
    #[serde(rename = "browsingDataArray", default)]
    pub browsing_data_array: Vec<RawBrowsingEntry>,
}

/// One visited URL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawBrowsingEntry {
    pub url: String,
    /// Seconds spent on the page
    #[serde(rename = "timeSpent")]
    pub time_spent: i64,
    /// Visit time in epoch milliseconds
    pub timestamp: i64,
}

impl RawBrowsingRecord {
    /// Browsing entries in input order
    pub fn entries(&self) -> &[RawBrowsingEntry] {
        &self.data.browsing_data_array
    }
}
