//! Raw record normalization
//!
//! Turns a [`RawBrowsingRecord`](crate::models::RawBrowsingRecord) into the
//! rows persisted in the refined store.

pub mod browsing;
pub mod classify;

pub use browsing::{BrowsingTransformer, average_time_spent};
pub use classify::{determine_browsing_type, extract_base_domain};
