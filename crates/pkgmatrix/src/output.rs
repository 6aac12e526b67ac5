//! Writing rendered workflows to disk.
//!
//! Writes are atomic: content goes to a temporary file next to the target and
//! is renamed over it, so a failed run never leaves a half-written workflow.

use pkgmatrix_core::{Error, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Default location of the generated workflow
pub const DEFAULT_OUTPUT_PATH: &str = ".github/workflows/nightly.yml";

/// Status of a file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// File was newly created.
    Created,
    /// File existed and was updated with new content.
    Updated,
    /// File existed and content was unchanged.
    Unchanged,
    /// Would be created (dry-run mode).
    WouldCreate,
    /// Would be updated (dry-run mode).
    WouldUpdate,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Updated => write!(f, "Updated"),
            Self::Unchanged => write!(f, "Unchanged"),
            Self::WouldCreate => write!(f, "Would create"),
            Self::WouldUpdate => write!(f, "Would update"),
        }
    }
}

/// Comparison of a rendered workflow with the file on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Drift {
    /// File matches the rendered content byte for byte
    UpToDate,
    /// File exists with different content
    Stale,
    /// File does not exist
    Missing,
}

fn read_existing(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(e, path, "read")),
    }
}

/// Compare `content` with the file at `path`.
///
/// # Errors
///
/// Returns an I/O error if the file exists but cannot be read.
pub fn detect_drift(path: &Path, content: &str) -> Result<Drift> {
    Ok(match read_existing(path)? {
        None => Drift::Missing,
        Some(existing) if existing == content => Drift::UpToDate,
        Some(_) => Drift::Stale,
    })
}

/// Write `content` to `path` unless it is already up to date.
///
/// In dry-run mode nothing is touched and the `Would*` statuses are
/// returned instead.
///
/// # Errors
///
/// Returns an I/O error if the parent directory cannot be created or the
/// file cannot be written.
pub fn write_workflow(path: &Path, content: &str, dry_run: bool) -> Result<FileStatus> {
    let status = match (detect_drift(path, content)?, dry_run) {
        (Drift::UpToDate, _) => FileStatus::Unchanged,
        (Drift::Missing, true) => FileStatus::WouldCreate,
        (Drift::Stale, true) => FileStatus::WouldUpdate,
        (Drift::Missing, false) => FileStatus::Created,
        (Drift::Stale, false) => FileStatus::Updated,
    };

    if matches!(status, FileStatus::Created | FileStatus::Updated) {
        write_atomic(path, content)?;
    }

    tracing::info!(path = %path.display(), status = %status, "Processed workflow file");
    Ok(status)
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| Error::io(e, parent, "create directory"))?;

    let mut file =
        tempfile::NamedTempFile::new_in(parent).map_err(|e| Error::io(e, parent, "create"))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::io(e, file.path(), "write"))?;
    file.persist(path)
        .map_err(|e| Error::io(e.error, path, "rename"))?;
    Ok(())
}
