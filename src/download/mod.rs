//! Local download bookkeeping
//!
//! The destination directory is the dedup ledger: a book counts as
//! downloaded when a regular file with its name exists there. This module
//! holds the path rules shared by the fetcher, the gate and the sweeper.

mod gate;
mod sweeper;

pub use gate::should_download;
pub use sweeper::{sweep, SweepReport};

use crate::ExtractionError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use url::Url;

/// Computes where a download URL is stored
///
/// The file name is the last path segment of the URL, kept exactly as it
/// appears (still percent-encoded), so the same book maps to the same file on
/// every run.
///
/// # Returns
///
/// * `Ok(PathBuf)` - `directory/<file name>`
/// * `Err(ExtractionError::NoFileName)` - The URL path ends in `/` or is empty
pub fn destination_path(directory: &Path, download_url: &Url) -> Result<PathBuf, ExtractionError> {
    let file_name = download_url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ExtractionError::NoFileName {
            url: download_url.to_string(),
        })?;

    Ok(directory.join(file_name))
}

/// Path of the in-flight file for `destination`, e.g. `Book.pdf.tmp`
pub fn partial_path(destination: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(destination.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Returns true if `file_name` carries the partial-download suffix
pub fn is_partial_name(file_name: &str, suffix: &str) -> bool {
    file_name
        .strip_suffix(suffix)
        .is_some_and(|stem| stem.ends_with('.'))
}
