//! Record decoding

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RefinerError, RefinerResult};
use crate::models::RawBrowsingRecord;

/// Read and decode one input file
///
/// An unreadable file is an [`RefinerError::Io`]; malformed JSON or a
/// missing required field is a [`RefinerError::Parse`].
pub fn parse(path: &Path) -> RefinerResult<RawBrowsingRecord> {
    let content = fs::read(path).map_err(|e| RefinerError::io(path, e))?;
    serde_json::from_slice(&content)
        .map_err(|e| RefinerError::Parse(path.to_path_buf(), e.to_string()))
}

/// Decode a record from an in-memory JSON string
pub fn parse_str(content: &str) -> RefinerResult<RawBrowsingRecord> {
    serde_json::from_str(content)
        .map_err(|e| RefinerError::Parse(PathBuf::from("<memory>"), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const VALID: &str = r#"{
        "data": {"browsingDataArray": [
            {"url": "https://www.ebay.com/item", "timeSpent": 120, "timestamp": 1700000000000}
        ]},
        "created_time": 1700000000,
        "author": "user-1",
        "data_hash": "abc",
        "random_string": "xyz"
    }"#;

    #[test]
    fn test_parse_valid_record() {
        let record = parse_str(VALID).unwrap();
        assert_eq!(record.author, "user-1");
        assert_eq!(record.created_time, 1_700_000_000);
        assert_eq!(record.entries().len(), 1);
        assert_eq!(record.entries()[0].time_spent, 120);
    }

    #[test]
    fn test_parse_missing_browsing_array_is_empty() {
        let record = parse_str(r#"{"data": {}, "created_time": 1, "author": "a"}"#).unwrap();
        assert!(record.entries().is_empty());
    }

    #[test]
    fn test_parse_missing_author_fails() {
        let result = parse_str(r#"{"data": {}, "created_time": 1}"#);
        assert!(matches!(result, Err(RefinerError::Parse(..))));
    }

    #[test]
    fn test_parse_entry_missing_field_fails() {
        let result = parse_str(
            r#"{"data": {"browsingDataArray": [{"url": "https://a.com"}]}, "created_time": 1, "author": "a"}"#,
        );
        assert!(matches!(result, Err(RefinerError::Parse(..))));
    }

    #[test]
    fn test_parse_file_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();
        match parse(&path) {
            Err(RefinerError::Parse(p, _)) => assert_eq!(p, path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            parse(&dir.path().join("absent.json")),
            Err(RefinerError::Io(..))
        ));
    }
}
