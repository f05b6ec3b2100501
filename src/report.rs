//! Run report and per-stage diagnostics

use serde::Serialize;

use crate::error::RefinerError;
use crate::models::OutputDocument;

/// Pipeline stage a diagnostic was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Parse,
    Transform,
    Persist,
    Assemble,
    Schema,
    Encrypt,
    Upload,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Parse => "parse",
            Stage::Transform => "transform",
            Stage::Persist => "persist",
            Stage::Assemble => "assemble",
            Stage::Schema => "schema",
            Stage::Encrypt => "encrypt",
            Stage::Upload => "upload",
        };
        f.write_str(name)
    }
}

/// A non-fatal failure recorded during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub stage: Stage,
    /// File or artifact the failure concerns
    pub subject: String,
    /// Error kind, see [`RefinerError::kind`]
    pub kind: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(stage: Stage, subject: impl Into<String>, error: &RefinerError) -> Self {
        Self {
            stage,
            subject: subject.into(),
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }

    /// A stage that did not run because an earlier one failed
    pub fn skipped(stage: Stage, subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            stage,
            subject: subject.into(),
            kind: "skipped".to_string(),
            message: reason.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.subject, self.message)
    }
}

/// Outcome of the publish stages
#[derive(Debug, Clone, Default)]
pub struct PublishReport {
    /// Content id of the uploaded schema document
    pub schema_cid: Option<String>,
    /// Content id of the encrypted store
    pub artifact_cid: Option<String>,
    /// Retrieval locator of the encrypted store
    pub refinement_url: Option<String>,
    /// Set when the schema was both written and uploaded
    pub schema_published: bool,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of a refinement run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefineReport {
    pub output: OutputDocument,
    pub diagnostics: Vec<Diagnostic>,
    /// Files persisted successfully
    pub files_processed: usize,
    /// Files rejected by parsing, validation or persistence
    pub files_skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_cid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_cid: Option<String>,
    pub duration_ms: u64,
}

impl RefineReport {
    /// True when every file and every stage succeeded
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
