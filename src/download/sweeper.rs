//! Cleanup sweeper for partial downloads
//!
//! Interrupted transfers leave `<name>.<suffix>` files behind. The sweeper
//! removes them before a run starts. It is best-effort: a file that cannot be
//! removed is logged and skipped.

use crate::download::is_partial_name;
use std::io;
use std::path::{Path, PathBuf};

/// What a sweep did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Partial files that were deleted
    pub removed: Vec<PathBuf>,

    /// Partial files that could not be deleted, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Deletes every regular file in `directory` ending in `.<suffix>`
///
/// Only the directory itself is scanned, not its subdirectories. Files
/// without the suffix are never touched. An unreadable directory yields an
/// empty report.
pub fn sweep(directory: &Path, suffix: &str) -> SweepReport {
    sweep_with(directory, suffix, |path| std::fs::remove_file(path))
}

fn sweep_with<F>(directory: &Path, suffix: &str, remove: F) -> SweepReport
where
    F: Fn(&Path) -> io::Result<()>,
{
    let mut report = SweepReport::default();

    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot scan {} for partial downloads: {}", directory.display(), e);
            return report;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Error reading entry in {}: {}", directory.display(), e);
                continue;
            }
        };

        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| is_partial_name(name, suffix));

        if !is_file || !matches {
            continue;
        }

        let path = entry.path();
        match remove(&path) {
            Ok(()) => {
                tracing::info!("Deleted stale partial download {}", path.display());
                report.removed.push(path);
            }
            Err(e) => {
                tracing::warn!("Error while deleting file: {} : {}", path.display(), e);
                report.failed.push((path, e.to_string()));
            }
        }
    }

    report
}
