//! Refinement pipeline
//!
//! Scans the input directory, refines each file into a fresh store,
//! then assembles and publishes the last persisted record. Per-file
//! failures and publish-stage failures become diagnostics; only an
//! unusable input/output directory or cancellation aborts the run.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::assembler::assemble;
use crate::cancel::CancelToken;
use crate::config::RefinerConfig;
use crate::database::{RefinedStore, SqliteStore};
use crate::error::{RefinerError, RefinerResult};
use crate::ingest::{parse, scan};
use crate::models::OutputDocument;
use crate::publish::{AesGcmEncryptor, ContentStore, FileEncryptor, IpfsClient, Publisher};
use crate::report::{Diagnostic, RefineReport, Stage};
use crate::schema::schema_descriptor;
use crate::transform::BrowsingTransformer;

/// Pipeline driver
pub struct Refiner<C, E> {
    config: RefinerConfig,
    transformer: BrowsingTransformer,
    publisher: Publisher<C, E>,
    cancel: CancelToken,
}

impl Refiner<IpfsClient, AesGcmEncryptor> {
    /// Build a refiner talking to the configured IPFS API
    pub fn from_config(config: RefinerConfig, cancel: CancelToken) -> RefinerResult<Self> {
        let client = IpfsClient::from_config(&config, cancel.clone())?;
        Ok(Self::new(config, client, AesGcmEncryptor::new(), cancel))
    }
}

impl<C: ContentStore, E: FileEncryptor> Refiner<C, E> {
    pub fn new(config: RefinerConfig, content: C, encryptor: E, cancel: CancelToken) -> Self {
        let publisher = Publisher::new(config.clone(), content, encryptor, cancel.clone());
        Self {
            config,
            transformer: BrowsingTransformer::new(),
            publisher,
            cancel,
        }
    }

    /// Run the whole pipeline once
    pub fn run(&self) -> RefinerResult<RefineReport> {
        let started = Instant::now();
        let mut report = RefineReport::default();

        let output_dir = &self.config.paths.output_dir;
        std::fs::create_dir_all(output_dir).map_err(|e| RefinerError::io(output_dir, e))?;

        let files = scan(
            &self.config.paths.input_dir,
            &self.config.paths.input_extensions,
        )?;
        info!(
            "Refining {} file(s) from {}",
            files.len(),
            self.config.paths.input_dir.display()
        );

        let mut store: Option<SqliteStore> = None;
        for path in &files {
            self.cancel.check()?;
            match self.refine_file(path, &mut store) {
                Ok(()) => {
                    report.files_processed += 1;
                    info!("Refined {}", path.display());
                }
                Err((stage, e)) => {
                    report.files_skipped += 1;
                    warn!("Skipping {}: {}", path.display(), e);
                    report
                        .diagnostics
                        .push(Diagnostic::new(stage, path.display().to_string(), &e));
                }
            }
        }

        if let Some(store) = store {
            self.cancel.check()?;
            self.finish(store, &mut report)?;
        } else {
            info!("No record was persisted; nothing to publish");
        }

        report.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            "Refinement finished in {} ms: {} processed, {} skipped, {} diagnostic(s)",
            report.duration_ms,
            report.files_processed,
            report.files_skipped,
            report.diagnostics.len()
        );
        Ok(report)
    }

    /// Parse, validate and persist one file into a fresh store
    ///
    /// The record is built in a staging file first. The previous store
    /// stays in place until the staging file replaces it.
    fn refine_file(
        &self,
        path: &Path,
        store: &mut Option<SqliteStore>,
    ) -> Result<(), (Stage, RefinerError)> {
        let raw = parse(path).map_err(|e| (Stage::Parse, e))?;
        let refined = self
            .transformer
            .transform(&raw)
            .map_err(|e| (Stage::Transform, e))?;

        let staging = self.config.staging_db_path();
        let persisted = SqliteStore::create(&staging).and_then(|mut fresh| {
            fresh.persist(&refined)?;
            Ok(fresh)
        });
        let fresh = match persisted {
            Ok(fresh) => fresh,
            Err(e) => {
                discard_staging(&staging);
                return Err((Stage::Persist, RefinerError::from(e)));
            }
        };

        let db_path = self.config.db_path();
        let had_previous = match store.take() {
            Some(previous) => {
                if let Err(e) = previous.close() {
                    debug!("Closing previous store failed: {}", e);
                }
                true
            }
            None => false,
        };

        match fresh.promote(&db_path) {
            Ok(promoted) => {
                *store = Some(promoted);
                Ok(())
            }
            Err(e) => {
                discard_staging(&staging);
                if had_previous {
                    *store = SqliteStore::open(&db_path).ok();
                }
                Err((Stage::Persist, RefinerError::from(e)))
            }
        }
    }

    /// Assemble browsing data from the final store and publish it
    fn finish(&self, store: SqliteStore, report: &mut RefineReport) -> RefinerResult<()> {
        let db_path = self.config.db_path();
        let subject = db_path.display().to_string();
        let mut output = OutputDocument::default();

        match assemble(&store) {
            Ok(browsing) => output.browsing_data = browsing,
            Err(e) => {
                warn!("Assembling output failed: {}", e);
                report
                    .diagnostics
                    .push(Diagnostic::new(Stage::Assemble, subject.clone(), &e));
            }
        }

        // the store must be flushed and closed before it is encrypted
        if let Err(e) = store.close() {
            let e = RefinerError::from(e);
            warn!("Closing store failed: {}", e);
            report
                .diagnostics
                .push(Diagnostic::new(Stage::Persist, subject, &e));
        }

        let descriptor = schema_descriptor(&self.config.schema);
        let published = self.publisher.publish(&descriptor, &db_path)?;

        if published.schema_published {
            output.schema = Some(descriptor);
        }
        output.refinement_url = published.refinement_url;
        report.schema_cid = published.schema_cid;
        report.artifact_cid = published.artifact_cid;
        report.diagnostics.extend(published.diagnostics);
        report.output = output;
        Ok(())
    }
}

fn discard_staging(staging: &Path) {
    if staging.exists()
        && let Err(e) = std::fs::remove_file(staging)
    {
        debug!("Removing staging store {} failed: {}", staging.display(), e);
    }
}
