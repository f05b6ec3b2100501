//! Models module
//!
//! Raw input records, the normalized rows persisted in the refined store,
//! the structural schema description and the public result document.

pub mod output;
pub mod raw;
pub mod refined;
pub mod schema;

pub use output::{BrowsingEntryOutput, BrowsingOutput, BrowsingStatsOutput, OutputDocument};
pub use raw::{RawBrowsingData, RawBrowsingEntry, RawBrowsingRecord};
pub use refined::{Author, BrowsingType, Entry, RefinedRecord, Stats, parse_timestamp};
pub use schema::{
    Cardinality, ColumnDescriptor, ForeignKey, ForeignKeyDetails, ModelSchema,
    RelationshipDescriptor, SchemaDescriptor, TableDescriptor,
};
