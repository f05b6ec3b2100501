//! Publish stages
//!
//! Schema upload, store encryption and encrypted upload each fail on
//! their own: a failed stage is recorded as a diagnostic and only the
//! stages that depend on it are skipped.

pub mod encrypt;
pub mod ipfs;

pub use encrypt::{AesGcmEncryptor, FileEncryptor};
pub use ipfs::{ContentStore, IpfsClient};

use std::path::Path;

use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::config::RefinerConfig;
use crate::error::{RefinerError, RefinerResult};
use crate::models::SchemaDescriptor;
use crate::report::{Diagnostic, PublishReport, Stage};
use crate::schema::to_json_pretty;

/// Runs the publish stages against a content store and an encryptor
pub struct Publisher<C, E> {
    config: RefinerConfig,
    content: C,
    encryptor: E,
    cancel: CancelToken,
}

impl<C: ContentStore, E: FileEncryptor> Publisher<C, E> {
    pub fn new(config: RefinerConfig, content: C, encryptor: E, cancel: CancelToken) -> Self {
        Self {
            config,
            content,
            encryptor,
            cancel,
        }
    }

    pub fn content_store(&self) -> &C {
        &self.content
    }

    /// Publish the schema document and the encrypted store at `db_path`
    ///
    /// Only cancellation is returned as an error.
    pub fn publish(
        &self,
        descriptor: &SchemaDescriptor,
        db_path: &Path,
    ) -> RefinerResult<PublishReport> {
        let mut report = PublishReport::default();

        self.cancel.check()?;
        match self.publish_schema(descriptor) {
            Ok(cid) => {
                info!("Schema uploaded with content id {}", cid);
                report.schema_cid = Some(cid);
                report.schema_published = true;
            }
            Err(RefinerError::Cancelled) => return Err(RefinerError::Cancelled),
            Err(e) => {
                warn!("Schema publish failed: {}", e);
                let stage = if matches!(e, RefinerError::Upload(_)) {
                    Stage::Upload
                } else {
                    Stage::Schema
                };
                report.diagnostics.push(Diagnostic::new(
                    stage,
                    self.config.schema_path().display().to_string(),
                    &e,
                ));
            }
        }

        self.cancel.check()?;
        let encrypted = match self.encryptor.encrypt(&self.config.encryption.key, db_path) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Encryption of {} failed: {}", db_path.display(), e);
                report.diagnostics.push(Diagnostic::new(
                    Stage::Encrypt,
                    db_path.display().to_string(),
                    &e,
                ));
                None
            }
        };

        self.cancel.check()?;
        match encrypted {
            Some(path) => match self.content.add_file(&path) {
                Ok(cid) => {
                    let url = self.config.locator(&cid);
                    info!("Encrypted store uploaded: {}", url);
                    report.artifact_cid = Some(cid);
                    report.refinement_url = Some(url);
                }
                Err(RefinerError::Cancelled) => return Err(RefinerError::Cancelled),
                Err(e) => {
                    warn!("Upload of {} failed: {}", path.display(), e);
                    report.diagnostics.push(Diagnostic::new(
                        Stage::Upload,
                        path.display().to_string(),
                        &e,
                    ));
                }
            },
            None => report.diagnostics.push(Diagnostic::skipped(
                Stage::Upload,
                db_path.display().to_string(),
                "encrypted store upload skipped: encryption failed",
            )),
        }

        Ok(report)
    }

    fn publish_schema(&self, descriptor: &SchemaDescriptor) -> RefinerResult<String> {
        let json = to_json_pretty(descriptor)?;
        let path = self.config.schema_path();
        std::fs::write(&path, &json).map_err(|e| RefinerError::io(&path, e))?;
        self.content.add_bytes(crate::config::SCHEMA_FILENAME, json.into_bytes())
    }
}
