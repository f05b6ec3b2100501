//! Input discovery and decoding
//!
//! - [`scanner`]: enumerates candidate files in the input directory
//! - [`parser`]: decodes a file into a [`RawBrowsingRecord`](crate::models::RawBrowsingRecord)

pub mod parser;
pub mod scanner;

pub use parser::{parse, parse_str};
pub use scanner::{matches_extension, scan};
