//! Browsing refiner
//!
//! Turns per-user browsing-activity exports into a small relational
//! dataset and publishes it:
//! - Input scanning and record parsing
//! - Normalization into Author/Entry/Stats rows with a browsing-category label
//! - A static schema description of the persisted model
//! - Encryption of the store and upload to a content-addressed store

pub mod assembler;
pub mod cancel;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod ingest;
pub mod models;
pub mod publish;
pub mod refiner;
pub mod report;
pub mod schema;
pub mod transform;

// Re-export commonly used types
pub use cancel::CancelToken;
pub use config::{LocatorStyle, RefinerConfig, sample_config};
pub use database::{DatabaseError, RefinedStore, SqliteStore};
pub use error::{RefinerError, RefinerResult};
pub use publish::{AesGcmEncryptor, ContentStore, FileEncryptor, IpfsClient, Publisher};
pub use refiner::Refiner;
pub use report::{Diagnostic, PublishReport, RefineReport, Stage};
pub use transform::{BrowsingTransformer, determine_browsing_type};

// Re-export models
pub use models::{
    Author, BrowsingType, Entry, OutputDocument, RawBrowsingRecord, RefinedRecord,
    SchemaDescriptor, Stats,
};
