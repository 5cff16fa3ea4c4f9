//! Batch extraction support shared by the FST and PAK readers
//!
//! Extraction is best-effort: an entry that cannot be read or written is
//! logged, counted as skipped and the batch moves on.

use crate::Result;
use log::warn;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Progress report passed to extraction callbacks
#[derive(Debug, Clone)]
pub struct ExtractProgress {
    /// Number of entries processed so far, including this one
    pub current: usize,
    /// Total number of entries in the batch
    pub total: usize,
    /// Display name of the entry being processed
    pub name: String,
}

impl ExtractProgress {
    /// Create a progress report for one entry
    pub fn new(current: usize, total: usize, name: impl Into<String>) -> Self {
        Self {
            current,
            total,
            name: name.into(),
        }
    }

    /// Completed fraction in `0.0..=1.0`
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.current as f32 / self.total as f32
        }
    }
}

/// Outcome of a batch extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractSummary {
    /// Entries written to disk
    pub extracted: usize,
    /// Entries that were skipped
    pub skipped: usize,
    /// Name and reason for each skipped entry
    pub failures: Vec<(String, String)>,
}

impl ExtractSummary {
    /// Record a skipped entry and log why
    pub fn skip(&mut self, name: impl Into<String>, reason: impl ToString) {
        let name = name.into();
        let reason = reason.to_string();
        warn!("Skipping {name}: {reason}");
        self.skipped += 1;
        self.failures.push((name, reason));
    }

    /// Fold another summary into this one
    pub fn merge(&mut self, other: ExtractSummary) {
        self.extracted += other.extracted;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }

    /// True when nothing was skipped
    pub fn is_complete(&self) -> bool {
        self.skipped == 0
    }
}

/// Turn an archive path into a relative filesystem path
///
/// Returns `None` for empty paths and for paths that would escape the output
/// directory (`..`, absolute paths, drive prefixes).
pub fn safe_relative_path(archive_path: &str) -> Option<PathBuf> {
    let normalized = archive_path.replace('\\', "/");
    let candidate = Path::new(&normalized);
    let mut out = PathBuf::new();

    for component in candidate.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Write `data` to `path`, creating parent directories as needed
pub fn write_output(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, data)?;
    Ok(())
}
