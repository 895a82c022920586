//! Per-link outcome definitions
//!
//! Errors are not represented here; the orchestrator pairs an outcome with
//! the error type as `Result<LinkOutcome, HarvestError>`.

use std::fmt;
use std::path::{Path, PathBuf};

/// What happened to a candidate link that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The file was transferred and promoted to its final name
    Downloaded {
        /// Where the file now lives
        destination: PathBuf,
        /// Bytes written
        bytes: u64,
    },

    /// A regular file already existed at the destination
    AlreadyPresent { destination: PathBuf },

    /// The subpage answered with something other than 200
    NotFound { status: u16 },
}

impl LinkOutcome {
    /// Returns true if a transfer happened
    pub fn is_downloaded(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }

    /// Returns true if the download gate skipped the file
    pub fn is_already_present(&self) -> bool {
        matches!(self, Self::AlreadyPresent { .. })
    }

    /// Destination path, if the link resolved to a file
    pub fn destination(&self) -> Option<&Path> {
        match self {
            Self::Downloaded { destination, .. } | Self::AlreadyPresent { destination } => {
                Some(destination.as_path())
            }
            Self::NotFound { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Downloaded { .. } => "downloaded",
            Self::AlreadyPresent { .. } => "already_present",
            Self::NotFound { .. } => "not_found",
        }
    }
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downloaded { destination, bytes } => {
                write!(f, "downloaded {} ({} bytes)", destination.display(), bytes)
            }
            Self::AlreadyPresent { destination } => {
                write!(f, "already present at {}", destination.display())
            }
            Self::NotFound { status } => write!(f, "not a subpage (HTTP {})", status),
        }
    }
}
