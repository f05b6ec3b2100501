//! Refiner configuration file support
//!
//! Handles parsing of `refiner.toml` configuration files and
//! environment variable overrides. The resulting [`RefinerConfig`] is
//! built once at startup and passed into each component.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::error::{RefinerError, RefinerResult};

/// Default configuration filename
pub const CONFIG_FILENAME: &str = "refiner.toml";

/// Filename of the refined store inside the output directory
pub const DB_FILENAME: &str = "db.libsql";

/// Filename a new store is written under before it replaces the published one
pub const STAGING_DB_FILENAME: &str = "db.libsql.tmp";

/// Filename of the schema document inside the output directory
pub const SCHEMA_FILENAME: &str = "schema.json";

/// Environment variable for the input directory
pub const ENV_INPUT_DIR: &str = "INPUT_DIR";

/// Environment variable for the output directory
pub const ENV_OUTPUT_DIR: &str = "OUTPUT_DIR";

/// Environment variable for the accepted input extensions (comma separated)
pub const ENV_INPUT_EXTENSIONS: &str = "INPUT_EXTENSIONS";

/// Environment variable for the refinement encryption key
pub const ENV_ENCRYPTION_KEY: &str = "REFINEMENT_ENCRYPTION_KEY";

/// Environment variable for the IPFS API base URL
pub const ENV_IPFS_API_URL: &str = "IPFS_API_URL";

/// Environment variable for the IPFS gateway base URL
pub const ENV_IPFS_GATEWAY_URL: &str = "IPFS_GATEWAY_URL";

/// Environment variable for the locator style
pub const ENV_IPFS_LOCATOR_STYLE: &str = "IPFS_LOCATOR_STYLE";

/// Environment variable for the upload timeout in seconds
pub const ENV_IPFS_TIMEOUT_SECS: &str = "IPFS_TIMEOUT_SECS";

/// Environment variable for the upload retry count
pub const ENV_IPFS_MAX_RETRIES: &str = "IPFS_MAX_RETRIES";

/// Environment variable for the schema name
pub const ENV_SCHEMA_NAME: &str = "SCHEMA_NAME";

/// Environment variable for the schema version
pub const ENV_SCHEMA_VERSION: &str = "SCHEMA_VERSION";

/// Environment variable for the schema description
pub const ENV_SCHEMA_DESCRIPTION: &str = "SCHEMA_DESCRIPTION";

/// Environment variable for the schema dialect
pub const ENV_SCHEMA_DIALECT: &str = "SCHEMA_DIALECT";

/// Shape of the retrieval locator built from a content identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocatorStyle {
    /// `{gateway}/ipfs/{cid}` (default)
    #[default]
    IpfsPath,
    /// `{gateway}/{cid}`, for gateway URLs that already end in `/ipfs`
    Direct,
}

impl LocatorStyle {
    /// Build the retrieval URL for a content identifier
    pub fn locator(&self, gateway_url: &str, cid: &str) -> String {
        let base = gateway_url.trim_end_matches('/');
        match self {
            LocatorStyle::IpfsPath => format!("{}/ipfs/{}", base, cid),
            LocatorStyle::Direct => format!("{}/{}", base, cid),
        }
    }
}

impl std::str::FromStr for LocatorStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ipfs-path" | "ipfs_path" | "path" => Ok(LocatorStyle::IpfsPath),
            "direct" => Ok(LocatorStyle::Direct),
            _ => Err(format!(
                "Unknown locator style: {}. Use 'ipfs-path' or 'direct'.",
                s
            )),
        }
    }
}

impl std::fmt::Display for LocatorStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocatorStyle::IpfsPath => write!(f, "ipfs-path"),
            LocatorStyle::Direct => write!(f, "direct"),
        }
    }
}

/// Input/output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsSection {
    /// Directory containing input files to process
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Directory where the store, schema and encrypted artifact are written
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Accepted input file extensions (case-insensitive, leading dot optional)
    #[serde(default = "default_input_extensions")]
    pub input_extensions: Vec<String>,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("/input")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("/output")
}

fn default_input_extensions() -> Vec<String> {
    vec!["json".to_string(), "bin".to_string()]
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            input_extensions: default_input_extensions(),
        }
    }
}

/// Encryption configuration section
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct EncryptionSection {
    /// Pre-shared key used to encrypt the refined store
    #[serde(default)]
    pub key: String,
}

impl std::fmt::Debug for EncryptionSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = if self.key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("EncryptionSection")
            .field("key", &key)
            .finish()
    }
}

/// Content-addressed store configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpfsSection {
    /// Base URL of the IPFS HTTP API (the `/add` endpoint is appended)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Base URL of the gateway used to build retrieval locators
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Locator shape
    #[serde(default)]
    pub locator_style: LocatorStyle,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Additional attempts after a failed upload
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff between attempts, doubled after each failure
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_api_url() -> String {
    "http://127.0.0.1:5001/api/v0".to_string()
}

fn default_gateway_url() -> String {
    "https://ipfs.io".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for IpfsSection {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            gateway_url: default_gateway_url(),
            locator_style: LocatorStyle::default(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Metadata attached to the published schema document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaSection {
    #[serde(default = "default_schema_name")]
    pub name: String,
    #[serde(default = "default_schema_version")]
    pub version: String,
    #[serde(default = "default_schema_description")]
    pub description: String,
    #[serde(default = "default_schema_dialect")]
    pub dialect: String,
}

fn default_schema_name() -> String {
    "Browsing Data Analytics".to_string()
}

fn default_schema_version() -> String {
    "0.0.1".to_string()
}

fn default_schema_description() -> String {
    "Schema for browsing data analytics, representing user browsing patterns and statistics"
        .to_string()
}

fn default_schema_dialect() -> String {
    "sqlite".to_string()
}

impl Default for SchemaSection {
    fn default() -> Self {
        Self {
            name: default_schema_name(),
            version: default_schema_version(),
            description: default_schema_description(),
            dialect: default_schema_dialect(),
        }
    }
}

/// Main configuration structure
///
/// Represents the `refiner.toml` configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RefinerConfig {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub encryption: EncryptionSection,

    #[serde(default)]
    pub ipfs: IpfsSection,

    #[serde(default)]
    pub schema: SchemaSection,
}

impl RefinerConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration
    ///
    /// Reads the given TOML file when provided (it must exist), otherwise
    /// starts from defaults. Environment overrides are applied last.
    pub fn load(config_path: Option<&Path>) -> RefinerResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    RefinerError::Configuration(format!(
                        "Failed to read config {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Self::parse(&content)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> RefinerResult<Self> {
        toml::from_str(content)
            .map_err(|e| RefinerError::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Convert configuration to TOML string
    pub fn to_toml(&self) -> RefinerResult<String> {
        toml::to_string_pretty(self).map_err(|e| {
            RefinerError::Configuration(format!("Failed to serialize config: {}", e))
        })
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(&mut self) -> RefinerResult<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    ///
    /// An unknown locator style is an error. Unparsable numbers are
    /// logged and leave the previous value in place.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> RefinerResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_INPUT_DIR) {
            self.paths.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR) {
            self.paths.output_dir = PathBuf::from(dir);
        }
        if let Some(exts) = lookup(ENV_INPUT_EXTENSIONS) {
            self.paths.input_extensions = exts
                .split(',')
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .collect();
        }

        if let Some(key) = lookup(ENV_ENCRYPTION_KEY) {
            self.encryption.key = key;
        }

        if let Some(url) = lookup(ENV_IPFS_API_URL) {
            self.ipfs.api_url = url;
        }
        if let Some(url) = lookup(ENV_IPFS_GATEWAY_URL) {
            self.ipfs.gateway_url = url;
        }
        if let Some(style) = lookup(ENV_IPFS_LOCATOR_STYLE) {
            self.ipfs.locator_style = style.parse().map_err(|e| {
                RefinerError::Configuration(format!("{}: {}", ENV_IPFS_LOCATOR_STYLE, e))
            })?;
        }
        if let Some(secs) = lookup(ENV_IPFS_TIMEOUT_SECS) {
            match secs.parse() {
                Ok(secs) => self.ipfs.timeout_secs = secs,
                Err(_) => warn!("Ignoring {}={:?}: not a number", ENV_IPFS_TIMEOUT_SECS, secs),
            }
        }
        if let Some(retries) = lookup(ENV_IPFS_MAX_RETRIES) {
            match retries.parse() {
                Ok(retries) => self.ipfs.max_retries = retries,
                Err(_) => warn!("Ignoring {}={:?}: not a number", ENV_IPFS_MAX_RETRIES, retries),
            }
        }

        if let Some(name) = lookup(ENV_SCHEMA_NAME) {
            self.schema.name = name;
        }
        if let Some(version) = lookup(ENV_SCHEMA_VERSION) {
            self.schema.version = version;
        }
        if let Some(description) = lookup(ENV_SCHEMA_DESCRIPTION) {
            self.schema.description = description;
        }
        if let Some(dialect) = lookup(ENV_SCHEMA_DIALECT) {
            self.schema.dialect = dialect;
        }
        Ok(())
    }

    /// Reject configurations no stage could run with
    ///
    /// The encryption key is deliberately not checked here: an empty key
    /// fails the encryption stage only, leaving the other stages to run.
    pub fn validate(&self) -> RefinerResult<()> {
        if self.paths.input_extensions.is_empty() {
            return Err(RefinerError::Configuration(
                "At least one input extension is required".to_string(),
            ));
        }
        if self.ipfs.api_url.trim().is_empty() {
            return Err(RefinerError::Configuration(
                "IPFS API URL must not be empty".to_string(),
            ));
        }
        if self.ipfs.gateway_url.trim().is_empty() {
            return Err(RefinerError::Configuration(
                "IPFS gateway URL must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the refined store
    pub fn db_path(&self) -> PathBuf {
        self.paths.output_dir.join(DB_FILENAME)
    }

    /// Path a new store is built at before it replaces `db_path`
    pub fn staging_db_path(&self) -> PathBuf {
        self.paths.output_dir.join(STAGING_DB_FILENAME)
    }

    /// Path of the schema document
    pub fn schema_path(&self) -> PathBuf {
        self.paths.output_dir.join(SCHEMA_FILENAME)
    }

    /// Per-request upload timeout
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.ipfs.timeout_secs)
    }

    /// Initial backoff between upload attempts
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.ipfs.retry_backoff_ms)
    }

    /// Build the retrieval locator for a content identifier
    pub fn locator(&self, cid: &str) -> String {
        self.ipfs.locator_style.locator(&self.ipfs.gateway_url, cid)
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Browsing refiner configuration
# Every value can be overridden by the environment variable named in its comment.

[paths]
# INPUT_DIR
input_dir = "/input"
# OUTPUT_DIR
output_dir = "/output"
# INPUT_EXTENSIONS (comma separated)
input_extensions = ["json", "bin"]

[encryption]
# REFINEMENT_ENCRYPTION_KEY - pre-shared key, required for the encrypted upload
key = ""

[ipfs]
# IPFS_API_URL
api_url = "http://127.0.0.1:5001/api/v0"
# IPFS_GATEWAY_URL
gateway_url = "https://ipfs.io"
# IPFS_LOCATOR_STYLE: "ipfs-path" ({gateway}/ipfs/{cid}) or "direct" ({gateway}/{cid})
locator_style = "ipfs-path"
# IPFS_TIMEOUT_SECS
timeout_secs = 30
# IPFS_MAX_RETRIES
max_retries = 3
retry_backoff_ms = 500

[schema]
name = "Browsing Data Analytics"
version = "0.0.1"
description = "Schema for browsing data analytics, representing user browsing patterns and statistics"
dialect = "sqlite"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = RefinerConfig::new();
        assert_eq!(config.paths.input_dir, PathBuf::from("/input"));
        assert_eq!(config.paths.input_extensions, vec!["json", "bin"]);
        assert!(config.encryption.key.is_empty());
        assert_eq!(config.ipfs.locator_style, LocatorStyle::IpfsPath);
        assert_eq!(config.schema.dialect, "sqlite");
        assert_eq!(config.db_path(), PathBuf::from("/output/db.libsql"));
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[paths]
input_dir = "data/in"
input_extensions = ["json", "zip"]

[ipfs]
gateway_url = "https://gateway.pinata.cloud/ipfs"
locator_style = "direct"
"#;
        let config = RefinerConfig::parse(toml).unwrap();
        assert_eq!(config.paths.input_dir, PathBuf::from("data/in"));
        assert_eq!(config.paths.output_dir, PathBuf::from("/output"));
        assert_eq!(config.paths.input_extensions, vec!["json", "zip"]);
        assert_eq!(config.ipfs.locator_style, LocatorStyle::Direct);
        assert_eq!(config.ipfs.max_retries, 3);
        assert_eq!(
            config.locator("QmHash"),
            "https://gateway.pinata.cloud/ipfs/QmHash"
        );
    }

    #[test]
    fn test_locator_styles() {
        assert_eq!(
            LocatorStyle::IpfsPath.locator("https://ipfs.vana.org/", "bafy"),
            "https://ipfs.vana.org/ipfs/bafy"
        );
        assert_eq!(
            LocatorStyle::Direct.locator("https://gw.example/ipfs", "bafy"),
            "https://gw.example/ipfs/bafy"
        );
    }

    #[test]
    fn test_locator_style_from_str() {
        assert_eq!(
            "ipfs-path".parse::<LocatorStyle>().unwrap(),
            LocatorStyle::IpfsPath
        );
        assert_eq!("DIRECT".parse::<LocatorStyle>().unwrap(), LocatorStyle::Direct);
        assert!("gateway".parse::<LocatorStyle>().is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_INPUT_DIR, "/data/in"),
            (ENV_INPUT_EXTENSIONS, " .json, .zip ,"),
            (ENV_ENCRYPTION_KEY, "secret"),
            (ENV_IPFS_LOCATOR_STYLE, "direct"),
            (ENV_IPFS_MAX_RETRIES, "not-a-number"),
            (ENV_SCHEMA_VERSION, "1.2.3"),
        ]
        .into_iter()
        .collect();

        let mut config = RefinerConfig::new();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.paths.input_dir, PathBuf::from("/data/in"));
        assert_eq!(config.paths.input_extensions, vec![".json", ".zip"]);
        assert_eq!(config.encryption.key, "secret");
        assert_eq!(config.ipfs.locator_style, LocatorStyle::Direct);
        // unparsable numbers keep the previous value
        assert_eq!(config.ipfs.max_retries, 3);
        assert_eq!(config.schema.version, "1.2.3");
        assert_eq!(config.schema.name, "Browsing Data Analytics");
    }

    #[test]
    fn test_unknown_locator_style_override_is_rejected() {
        let mut config = RefinerConfig::new();
        let result = config.apply_overrides(|name| {
            (name == ENV_IPFS_LOCATOR_STYLE).then(|| "drect".to_string())
        });

        match result {
            Err(RefinerError::Configuration(message)) => {
                assert!(message.contains(ENV_IPFS_LOCATOR_STYLE), "{}", message);
            }
            other => panic!("expected a configuration error, got {:?}", other),
        }
        assert_eq!(config.ipfs.locator_style, LocatorStyle::IpfsPath);
    }

    #[test]
    fn test_debug_redacts_key() {
        let mut config = RefinerConfig::new();
        config.encryption.key = "super-secret".to_string();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let mut config = RefinerConfig::new();
        config.paths.input_extensions.clear();
        assert!(matches!(
            config.validate(),
            Err(RefinerError::Configuration(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_configuration_error() {
        let dir = tempdir().unwrap();
        let result = RefinerConfig::load(Some(&dir.path().join(CONFIG_FILENAME)));
        assert!(matches!(result, Err(RefinerError::Configuration(_))));
    }

    #[test]
    fn test_to_toml_roundtrips_locator_style() {
        let mut config = RefinerConfig::new();
        config.ipfs.locator_style = LocatorStyle::Direct;
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("locator_style = \"direct\""));
        let parsed = RefinerConfig::parse(&toml).unwrap();
        assert_eq!(parsed.ipfs.locator_style, LocatorStyle::Direct);
    }

    #[test]
    fn test_sample_config_is_valid() {
        let config = RefinerConfig::parse(sample_config()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.ipfs.timeout_secs, 30);
    }
}
