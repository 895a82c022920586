//! Download gate
//!
//! The only dedup check in the crawler. Running a crawl twice performs at
//! most one transfer per file name because the second run finds the file.

use std::path::Path;

/// Returns true iff no regular file exists at `destination`
///
/// A directory or other non-file entry with the same name does not count as
/// a completed download.
pub fn should_download(destination: &Path) -> bool {
    !destination.is_file()
}
