//! Batch watermarking of zip archives.
//!
//! A job moves through `OPENED → EXTRACTED → (CLASSIFIED → PROCESSED|COPIED)*
//! → REPACKAGED → CLEANED_UP`. Both scratch areas are [`tempfile::TempDir`]s
//! owned by the job, so cleanup runs on every exit path including errors.
//!
//! Only an unreadable container fails the job. A single image that cannot be
//! rendered is copied through under its original name and counted in
//! [`ArchiveReport::fallback`]. An output name that is already taken (for
//! example `watermarked_a.png` in a container that also holds `a.png`) gets a
//! numeric suffix instead of overwriting the earlier entry.

pub mod classify;
pub mod package;

pub use classify::EntryClass;

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::error::ArchiveError;
use crate::render::WatermarkRenderer;
use crate::settings::WatermarkSettings;
use crate::types::{output_name, ArchiveOutput, ArchiveReport};

/// Applies a [`WatermarkRenderer`] to every image in a zip container.
pub struct ArchiveProcessor<'a> {
    renderer: &'a WatermarkRenderer,
    scratch_root: Option<PathBuf>,
}

impl<'a> ArchiveProcessor<'a> {
    pub fn new(renderer: &'a WatermarkRenderer) -> Self {
        Self {
            renderer,
            scratch_root: None,
        }
    }

    /// Create scratch directories under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// Watermark every image in `bytes` and return the rebuilt container.
    pub fn process(
        &self,
        bytes: &[u8],
        text: &str,
        settings: &WatermarkSettings,
    ) -> Result<ArchiveOutput, ArchiveError> {
        let start = std::time::Instant::now();
        tracing::info!("Processing archive ({} bytes)", bytes.len());

        let input_dir = self.scratch("inkmark-in-")?;
        let output_dir = self.scratch("inkmark-out-")?;

        package::extract(bytes, input_dir.path())?;
        let report = self.mirror(input_dir.path(), output_dir.path(), text, settings)?;
        let bytes = package::repackage(output_dir.path())?;

        tracing::info!(
            "Archive done in {:?}: {} processed, {} fallback, {} copied, {} skipped, {} renamed",
            start.elapsed(),
            report.processed,
            report.fallback,
            report.copied,
            report.skipped,
            report.renamed
        );
        Ok(ArchiveOutput { bytes, report })
    }

    /// Walk `input`, recreating its directories under `output` and writing
    /// one output file per retained input file.
    fn mirror(
        &self,
        input: &Path,
        output: &Path,
        text: &str,
        settings: &WatermarkSettings,
    ) -> Result<ArchiveReport, ArchiveError> {
        let mut report = ArchiveReport::default();

        for entry in WalkDir::new(input).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| match e.into_io_error() {
                Some(io) => ArchiveError::Io(io),
                None => ArchiveError::Io(std::io::Error::other("filesystem loop in archive")),
            })?;
            let Ok(rel) = entry.path().strip_prefix(input) else {
                continue;
            };
            let target = output.join(rel);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                std::fs::create_dir_all(&target)?;
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !file_type.is_file() {
                tracing::debug!("Skipping non-regular entry {:?}", rel);
                report.skipped += 1;
                continue;
            }

            match EntryClass::of(&name) {
                EntryClass::Hidden => {
                    tracing::debug!("Skipping hidden entry {:?}", rel);
                    report.skipped += 1;
                }
                EntryClass::Other => {
                    std::fs::copy(entry.path(), free_path(target, &mut report))?;
                    report.copied += 1;
                }
                EntryClass::Image => {
                    let source = std::fs::read(entry.path())?;
                    match self.renderer.render(&source, text, settings) {
                        Ok(rendered) => {
                            let target = target.with_file_name(output_name(&name));
                            std::fs::write(free_path(target, &mut report), rendered)?;
                            report.processed += 1;
                        }
                        Err(e) => {
                            tracing::warn!("Copying {:?} unprocessed: {}", rel, e);
                            std::fs::write(free_path(target, &mut report), source)?;
                            report.fallback += 1;
                            report.fallback_entries.push(rel.to_path_buf());
                        }
                    }
                }
            }
        }

        Ok(report)
    }

    fn scratch(&self, prefix: &str) -> Result<TempDir, ArchiveError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);
        let dir = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }
}

/// `target`, or the first `<stem>_<n>.<ext>` beside it that does not exist yet.
fn free_path(target: PathBuf, report: &mut ArchiveReport) -> PathBuf {
    if !target.exists() {
        return target;
    }
    let stem = target
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = target
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut n = 1;
    loop {
        let candidate = target.with_file_name(format!("{stem}_{n}{ext}"));
        if !candidate.exists() {
            tracing::warn!(
                "Output name {:?} already taken, writing {:?}",
                target.file_name().unwrap_or_default(),
                candidate.file_name().unwrap_or_default()
            );
            report.renamed += 1;
            return candidate;
        }
        n += 1;
    }
}
