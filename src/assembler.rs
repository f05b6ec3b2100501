//! Output assembler
//!
//! Reads the persisted aggregates back into the public result shape.

use tracing::debug;

use crate::database::RefinedStore;
use crate::error::RefinerResult;
use crate::models::{BrowsingEntryOutput, BrowsingOutput, BrowsingStatsOutput};

/// Build the browsing section of the result document from the store
///
/// Returns `None` when the store holds no stats row.
pub fn assemble<S: RefinedStore + ?Sized>(store: &S) -> RefinerResult<Option<BrowsingOutput>> {
    let Some(stats) = store.stats()? else {
        debug!("No stats row in store, nothing to assemble");
        return Ok(None);
    };

    let data = store
        .entries_for_author(&stats.author_id)?
        .into_iter()
        .map(|entry| BrowsingEntryOutput {
            url: entry.url,
            time_spent: entry.time_spent,
            timestamp: entry.timestamp.timestamp_millis(),
        })
        .collect();

    Ok(Some(BrowsingOutput {
        stats: BrowsingStatsOutput {
            urls: stats.url_count,
            average_time_spent: stats.average_time_spent,
            browsing_type: stats.browsing_type.to_string(),
        },
        data,
    }))
}
