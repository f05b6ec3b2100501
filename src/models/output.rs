//! Public result document

use serde::{Deserialize, Serialize};

use super::schema::SchemaDescriptor;

/// One browsing entry in the result document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowsingEntryOutput {
    pub url: String,
    #[serde(rename = "timeSpent")]
    pub time_spent: i64,
    /// Epoch milliseconds
    pub timestamp: i64,
}

/// Aggregates in the result document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowsingStatsOutput {
    pub urls: usize,
    #[serde(rename = "averageTimeSpent")]
    pub average_time_spent: f64,
    #[serde(rename = "type")]
    pub browsing_type: String,
}

/// Browsing data read back from the refined store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowsingOutput {
    pub stats: BrowsingStatsOutput,
    pub data: Vec<BrowsingEntryOutput>,
}

/// Externally visible result of a refinement run
///
/// Each field is set only when the stage producing it succeeded.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputDocument {
    /// Retrieval locator of the encrypted store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinement_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browsing_data: Option<BrowsingOutput>,
}

impl OutputDocument {
    /// True when no stage contributed anything
    pub fn is_empty(&self) -> bool {
        self.refinement_url.is_none() && self.schema.is_none() && self.browsing_data.is_none()
    }
}
