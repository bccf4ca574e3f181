//! Zip extraction into scratch storage and repackaging of a directory tree.

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::ArchiveError;

/// Unpack `bytes` into `dest`, returning the number of entries written.
///
/// Anything that prevents an entry from being read in full (bad central
/// directory, truncated data, failed checksum) is a corrupt container. Only
/// failures writing into `dest` are scratch-storage errors.
pub fn extract(bytes: &[u8], dest: &Path) -> Result<usize, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ArchiveError::CorruptContainer(e.to_string()))?;
    let mut written = 0;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| ArchiveError::CorruptContainer(e.to_string()))?;
        let Some(rel) = sanitize_entry_name(entry.name()) else {
            tracing::warn!("Ignoring entry with no usable path: {:?}", entry.name());
            continue;
        };
        let target = dest.join(rel);

        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            let mut data = Vec::new();
            entry.read_to_end(&mut data).map_err(|e| {
                ArchiveError::CorruptContainer(format!("{}: {}", entry.name(), e))
            })?;
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, data)?;
        }
        written += 1;
    }

    tracing::debug!("Extracted {} entries into {:?}", written, dest);
    Ok(written)
}

/// Relative path for a stored entry name.
///
/// Leading separators, drive prefixes, `.` and `..` components are dropped,
/// so the result always stays inside the extraction root. `None` when
/// nothing is left.
pub fn sanitize_entry_name(name: &str) -> Option<PathBuf> {
    let path: PathBuf = name
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .filter(|part| !part.ends_with(':'))
        .collect();
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

/// Zip the contents of `root`, entry names relative to it with `/`
/// separators. Directories get their own entries so empty ones survive.
pub fn repackage(root: &Path) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| ArchiveError::Repackage(e.to_string()))?;
        let rel = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| ArchiveError::Repackage(e.to_string()))?;
        let name = entry_name(rel);

        if entry.file_type().is_dir() {
            writer
                .add_directory(format!("{name}/"), options)
                .map_err(|e| ArchiveError::Repackage(e.to_string()))?;
        } else if entry.file_type().is_file() {
            writer
                .start_file(name, options)
                .map_err(|e| ArchiveError::Repackage(e.to_string()))?;
            copy_into(&mut File::open(entry.path())?, &mut writer)?;
        }
    }

    let cursor = writer
        .finish()
        .map_err(|e| ArchiveError::Repackage(e.to_string()))?;
    Ok(cursor.into_inner())
}

fn entry_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn copy_into<R: Read, W: Write + Seek>(
    reader: &mut R,
    writer: &mut ZipWriter<W>,
) -> Result<(), ArchiveError> {
    std::io::copy(reader, writer)?;
    Ok(())
}
