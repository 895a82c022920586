//! SQLite manifest implementation
//!
//! This module provides a SQLite-based implementation of the Manifest trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Manifest, StorageError, StorageResult};
use crate::storage::{DownloadRecord, RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite manifest backend
pub struct SqliteManifest {
    conn: Connection,
}

impl SqliteManifest {
    /// Opens or creates a manifest database
    ///
    /// The parent directory is created when missing.
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteManifest)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn download_from_row(row: &Row<'_>) -> rusqlite::Result<DownloadRecord> {
    Ok(DownloadRecord {
        file_name: row.get(0)?,
        source_url: row.get(1)?,
        destination: row.get(2)?,
        bytes: row.get::<_, i64>(3)? as u64,
        downloaded_at: row.get(4)?,
        run_id: row.get(5)?,
    })
}

impl Manifest for SqliteManifest {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT id, started_at, finished_at, config_hash, status, downloaded, failed
             FROM runs WHERE id = ?1",
        )?;

        let run = stmt
            .query_row(params![run_id], |row| {
                Ok(RunRecord {
                    id: row.get(0)?,
                    started_at: row.get(1)?,
                    finished_at: row.get(2)?,
                    config_hash: row.get(3)?,
                    status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
                        .unwrap_or(RunStatus::Running),
                    downloaded: row.get::<_, i64>(5)? as u64,
                    failed: row.get::<_, i64>(6)? as u64,
                })
            })
            .optional()?;

        run.ok_or(StorageError::RunNotFound(run_id))
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        downloaded: u64,
        failed: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, downloaded = ?3, failed = ?4
             WHERE id = ?5",
            params![
                status.to_db_string(),
                now,
                downloaded as i64,
                failed as i64,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Downloads =====

    fn record_download(
        &mut self,
        run_id: i64,
        file_name: &str,
        source_url: &str,
        destination: &str,
        bytes: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO downloads (file_name, source_url, destination, bytes, downloaded_at, run_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(file_name) DO UPDATE SET
                source_url = excluded.source_url,
                destination = excluded.destination,
                bytes = excluded.bytes,
                downloaded_at = excluded.downloaded_at,
                run_id = excluded.run_id",
            params![file_name, source_url, destination, bytes as i64, now, run_id],
        )?;
        Ok(())
    }

    fn get_download(&self, file_name: &str) -> StorageResult<Option<DownloadRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT file_name, source_url, destination, bytes, downloaded_at, run_id
             FROM downloads WHERE file_name = ?1",
        )?;

        let record = stmt
            .query_row(params![file_name], download_from_row)
            .optional()?;
        Ok(record)
    }

    fn list_downloads(&self) -> StorageResult<Vec<DownloadRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT file_name, source_url, destination, bytes, downloaded_at, run_id
             FROM downloads ORDER BY downloaded_at ASC, file_name ASC",
        )?;

        let records = stmt
            .query_map([], download_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn count_downloads(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM downloads", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
