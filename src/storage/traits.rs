//! Manifest trait and error types
//!
//! This module defines the trait interface for download manifests and
//! associated error types.

use crate::storage::{DownloadRecord, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during manifest operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for download manifest backends
///
/// A manifest is an audit trail. The crawler never consults it to decide
/// whether to download; the destination directory stays the source of truth.
pub trait Manifest {
    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file, empty when defaults were used
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Marks a run as finished with its final status and counts
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        downloaded: u64,
        failed: u64,
    ) -> StorageResult<()>;

    // ===== Downloads =====

    /// Records a completed download
    ///
    /// A later download of the same file name replaces the earlier record.
    fn record_download(
        &mut self,
        run_id: i64,
        file_name: &str,
        source_url: &str,
        destination: &str,
        bytes: u64,
    ) -> StorageResult<()>;

    /// Gets the record for a file name
    fn get_download(&self, file_name: &str) -> StorageResult<Option<DownloadRecord>>;

    /// Lists all recorded downloads, oldest first
    fn list_downloads(&self) -> StorageResult<Vec<DownloadRecord>>;

    /// Counts recorded downloads
    fn count_downloads(&self) -> StorageResult<u64>;
}
