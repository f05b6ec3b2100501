//! End-to-end refinement runs against a fake content store

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use browsing_refiner::database::{RefinedStore, SqliteStore};
use browsing_refiner::publish::encrypt::AesGcmEncryptor;
use browsing_refiner::{
    CancelToken, ContentStore, Refiner, RefinerConfig, RefinerError, RefinerResult, Stage,
};
use serde_json::json;
use tempfile::TempDir;

const EBAY_RECORD: &str = r#"{
    "author": "user123",
    "created_time": 1700000000,
    "data": {
        "browsingDataArray": [
            {"url": "https://www.ebay.com/itm/123", "timeSpent": 120, "timestamp": 1700000000000}
        ]
    }
}"#;

const NEWS_RECORD: &str = r#"{
    "author": "reader",
    "created_time": 1700000500,
    "data_hash": "ignored",
    "data": {
        "browsingDataArray": [
            {"url": "https://edition.cnn.com/world", "timeSpent": 40, "timestamp": 1700000100000},
            {"url": "https://www.bbc.com/news", "timeSpent": 20, "timestamp": 1700000200000},
            {"url": "https://cnn.com/us", "timeSpent": 30, "timestamp": 1700000300000}
        ]
    }
}"#;

/// Uploads shared with the test after the refiner takes ownership
type Uploads = Rc<RefCell<Vec<(String, Vec<u8>)>>>;

#[derive(Default)]
struct FakeStore {
    uploads: Uploads,
    reject: Vec<String>,
}

impl ContentStore for FakeStore {
    fn add_bytes(&self, name: &str, bytes: Vec<u8>) -> RefinerResult<String> {
        if self.reject.iter().any(|r| r == name) {
            return Err(RefinerError::Upload(format!("{} rejected by gateway", name)));
        }
        self.uploads.borrow_mut().push((name.to_string(), bytes));
        Ok(format!("cid-{}", name))
    }
}

struct Harness {
    _dir: TempDir,
    config: RefinerConfig,
    uploads: Uploads,
}

impl Harness {
    fn new(key: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let mut config = RefinerConfig::new();
        config.paths.input_dir = dir.path().join("input");
        config.paths.output_dir = dir.path().join("output");
        config.encryption.key = key.to_string();
        std::fs::create_dir_all(&config.paths.input_dir).unwrap();
        Self {
            _dir: dir,
            config,
            uploads: Uploads::default(),
        }
    }

    fn input(&self, name: &str, content: &str) {
        std::fs::write(self.config.paths.input_dir.join(name), content).unwrap();
    }

    fn refiner(&self, reject: &[&str]) -> Refiner<FakeStore, AesGcmEncryptor> {
        self.refiner_with_cancel(reject, CancelToken::new())
    }

    fn refiner_with_cancel(
        &self,
        reject: &[&str],
        cancel: CancelToken,
    ) -> Refiner<FakeStore, AesGcmEncryptor> {
        let store = FakeStore {
            uploads: self.uploads.clone(),
            reject: reject.iter().map(|r| r.to_string()).collect(),
        };
        Refiner::new(self.config.clone(), store, AesGcmEncryptor::new(), cancel)
    }

    fn uploaded(&self, name: &str) -> Option<Vec<u8>> {
        self.uploads
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.clone())
    }
}

#[test]
fn test_ebay_example_end_to_end() {
    let harness = Harness::new("secret");
    harness.input("export.json", EBAY_RECORD);

    let report = harness.refiner(&[]).run().unwrap();

    assert!(report.is_clean(), "{:?}", report.diagnostics);
    assert_eq!(report.files_processed, 1);
    assert_eq!(report.files_skipped, 0);

    let output = serde_json::to_value(&report.output).unwrap();
    assert_eq!(
        output["browsing_data"],
        json!({
            "stats": {"urls": 1, "averageTimeSpent": 120.0, "type": "Shopping"},
            "data": [{"url": "https://www.ebay.com/itm/123", "timeSpent": 120, "timestamp": 1700000000000i64}]
        })
    );
    assert_eq!(
        output["refinement_url"],
        "https://ipfs.io/ipfs/cid-db.libsql.enc"
    );
    assert_eq!(output["schema"]["name"], "Browsing Data Analytics");
    assert_eq!(report.schema_cid.as_deref(), Some("cid-schema.json"));
    assert_eq!(report.artifact_cid.as_deref(), Some("cid-db.libsql.enc"));

    // the uploaded schema is the file written to the output directory
    let schema_file =
        std::fs::read(harness.config.paths.output_dir.join("schema.json")).unwrap();
    assert_eq!(harness.uploaded("schema.json").unwrap(), schema_file);
}

#[test]
fn test_uploaded_artifact_decrypts_to_refined_store() {
    let harness = Harness::new("secret");
    harness.input("export.json", NEWS_RECORD);

    harness.refiner(&[]).run().unwrap();

    let sealed = harness.uploaded("db.libsql.enc").unwrap();
    let plaintext = AesGcmEncryptor::decrypt_bytes("secret", &sealed).unwrap();
    assert!(plaintext.starts_with(b"SQLite format 3\0"));
    assert!(AesGcmEncryptor::decrypt_bytes("other", &sealed).is_err());

    let restored = harness.config.paths.output_dir.join("restored.db");
    std::fs::write(&restored, plaintext).unwrap();
    let store = SqliteStore::open(&restored).unwrap();
    assert_eq!(store.author_count().unwrap(), 1);
    assert_eq!(store.entries_for_author("reader").unwrap().len(), 3);
    let stats = store.stats().unwrap().unwrap();
    assert_eq!(stats.average_time_spent, 30.0);
    assert_eq!(stats.browsing_type.as_str(), "News");
}

#[test]
fn test_malformed_file_is_skipped() {
    let harness = Harness::new("secret");
    harness.input("a_broken.json", "{\"author\": \"x\", ");
    harness.input("b_valid.json", EBAY_RECORD);

    let report = harness.refiner(&[]).run().unwrap();

    assert_eq!(report.files_processed, 1);
    assert_eq!(report.files_skipped, 1);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].stage, Stage::Parse);
    assert!(report.diagnostics[0].subject.ends_with("a_broken.json"));

    let browsing = report.output.browsing_data.unwrap();
    assert_eq!(browsing.stats.browsing_type, "Shopping");
    assert!(report.output.refinement_url.is_some());
}

#[test]
fn test_empty_author_persists_nothing() {
    let harness = Harness::new("secret");
    harness.input(
        "anon.json",
        r#"{"author": "", "created_time": 1700000000, "data": {"browsingDataArray": []}}"#,
    );

    let report = harness.refiner(&[]).run().unwrap();

    assert_eq!(report.files_skipped, 1);
    assert_eq!(report.diagnostics[0].stage, Stage::Transform);
    assert_eq!(report.diagnostics[0].kind, "validation");
    assert!(report.output.is_empty());
    assert!(harness.uploads.borrow().is_empty());
    assert!(!harness.config.db_path().exists());
}

#[test]
fn test_empty_key_omits_refinement_url() {
    let harness = Harness::new("");
    harness.input("export.json", EBAY_RECORD);

    let report = harness.refiner(&[]).run().unwrap();

    assert!(report.output.refinement_url.is_none());
    assert!(report.output.browsing_data.is_some());
    assert!(report.output.schema.is_some());
    assert!(report.artifact_cid.is_none());

    let encrypt = report
        .diagnostics
        .iter()
        .find(|d| d.stage == Stage::Encrypt)
        .unwrap();
    assert_eq!(encrypt.kind, "configuration");
    assert!(harness.uploaded("db.libsql.enc").is_none());
}

#[test]
fn test_schema_upload_failure_keeps_other_stages() {
    let harness = Harness::new("secret");
    harness.input("export.json", EBAY_RECORD);

    let report = harness.refiner(&["schema.json"]).run().unwrap();

    assert!(report.output.schema.is_none());
    assert!(report.output.browsing_data.is_some());
    assert_eq!(
        report.output.refinement_url.as_deref(),
        Some("https://ipfs.io/ipfs/cid-db.libsql.enc")
    );
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].kind, "upload");
}

#[test]
fn test_last_valid_file_wins_and_store_is_not_accumulated() {
    let harness = Harness::new("secret");
    harness.input("1.json", NEWS_RECORD);
    harness.input("2.json", EBAY_RECORD);

    let report = harness.refiner(&[]).run().unwrap();

    assert_eq!(report.files_processed, 2);
    let browsing = report.output.browsing_data.unwrap();
    assert_eq!(browsing.stats.urls, 1);
    assert_eq!(browsing.stats.browsing_type, "Shopping");

    let store = SqliteStore::open(harness.config.db_path()).unwrap();
    assert_eq!(store.author_count().unwrap(), 1);
    assert!(store.author("reader").unwrap().is_none());
}

#[test]
fn test_extension_filter() {
    let harness = Harness::new("secret");
    harness.input("export.BIN", EBAY_RECORD);
    harness.input("notes.txt", "not json at all");

    let report = harness.refiner(&[]).run().unwrap();

    assert_eq!(report.files_processed, 1);
    assert_eq!(report.files_skipped, 0);
    assert!(report.is_clean());
}

#[test]
fn test_empty_input_directory_yields_empty_output() {
    let harness = Harness::new("secret");

    let report = harness.refiner(&[]).run().unwrap();

    assert!(report.output.is_empty());
    assert_eq!(report.files_processed, 0);
    assert!(harness.uploads.borrow().is_empty());
}

#[test]
fn test_missing_input_directory_is_fatal() {
    let mut harness = Harness::new("secret");
    harness.config.paths.input_dir = Path::new("/definitely/not/here").to_path_buf();

    assert!(matches!(
        harness.refiner(&[]).run(),
        Err(RefinerError::Io(..))
    ));
}

#[test]
fn test_cancelled_run_stops() {
    let harness = Harness::new("secret");
    harness.input("export.json", EBAY_RECORD);

    let cancel = CancelToken::new();
    cancel.cancel();
    let result = harness.refiner_with_cancel(&[], cancel).run();

    assert!(matches!(result, Err(RefinerError::Cancelled)));
    assert!(harness.uploads.borrow().is_empty());
}

#[test]
fn test_small_entry_timestamps_round_trip_as_milliseconds() {
    let harness = Harness::new("secret");
    harness.input(
        "early.json",
        r#"{
            "author": "early",
            "created_time": 1700000000,
            "data": {
                "browsingDataArray": [
                    {"url": "https://cnn.com/a", "timeSpent": 10, "timestamp": 5000},
                    {"url": "https://cnn.com/b", "timeSpent": 20, "timestamp": 99999999999}
                ]
            }
        }"#,
    );

    let report = harness.refiner(&[]).run().unwrap();

    let browsing = report.output.browsing_data.unwrap();
    let timestamps: Vec<i64> = browsing.data.iter().map(|e| e.timestamp).collect();
    assert_eq!(timestamps, vec![5000, 99_999_999_999]);
}
