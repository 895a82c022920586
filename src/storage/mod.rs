//! Storage module for the optional download manifest
//!
//! The manifest records which files were fetched, from where, and by which
//! run. It is written after a successful transfer and never read by the
//! download gate.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteManifest;
pub use traits::{Manifest, StorageError, StorageResult};

/// A completed download as stored in the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    pub file_name: String,
    pub source_url: String,
    pub destination: String,
    pub bytes: u64,
    pub downloaded_at: String,
    pub run_id: i64,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub downloaded: u64,
    pub failed: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
