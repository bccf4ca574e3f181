//! Data types returned by the Inkmark engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pipeline::InputKind;

/// Per-entry tally of an archive job.
///
/// A job that "completed with N items copied unprocessed" reports
/// `fallback == N`; job-level failures never produce a report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveReport {
    /// Images rendered and written under a `watermarked_` name
    pub processed: usize,

    /// Images that failed to render and were copied unchanged
    pub fallback: usize,

    /// Non-image files copied verbatim
    pub copied: usize,

    /// Hidden files (and links) left out of the output
    pub skipped: usize,

    /// Written entries moved to a free name because their output name was
    /// already taken. Also counted in one of the tallies above.
    #[serde(default)]
    pub renamed: usize,

    /// Relative paths of the fallback entries
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_entries: Vec<PathBuf>,
}

impl ArchiveReport {
    /// Number of file entries written to the output container.
    pub fn written(&self) -> usize {
        self.processed + self.fallback + self.copied
    }

    /// Whether every image in the job rendered.
    pub fn is_clean(&self) -> bool {
        self.fallback == 0
    }
}

/// A finished archive job: the rebuilt container plus its tally.
#[derive(Debug, Clone)]
pub struct ArchiveOutput {
    pub bytes: Vec<u8>,
    pub report: ArchiveReport,
}

/// Result of [`crate::Inkmark::process`]: the artifact and what it was.
#[derive(Debug, Clone)]
pub struct ProcessedArtifact {
    /// What the input was treated as
    pub kind: InputKind,

    /// Output file name, `watermarked_<original>`
    pub file_name: String,

    /// JPEG or zip bytes
    pub bytes: Vec<u8>,

    /// Present for archive jobs
    pub report: Option<ArchiveReport>,
}

/// Prefix for every rendered output name.
pub const OUTPUT_PREFIX: &str = "watermarked_";

/// `watermarked_<name>`.
pub fn output_name(name: &str) -> String {
    format!("{OUTPUT_PREFIX}{name}")
}
