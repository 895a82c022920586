//! Per-run crawl report
//!
//! Every candidate link gets a `LinkReport` carrying either its outcome or
//! the error that stopped it. The report is what the binary prints at the end
//! of a run.

use crate::download::SweepReport;
use crate::state::LinkOutcome;
use crate::storage::DownloadRecord;
use crate::HarvestError;
use std::time::Duration;

/// Result of processing one candidate link
#[derive(Debug)]
pub struct LinkReport {
    /// Position of the link on the index page, starting at 1
    pub position: usize,

    /// The raw href value
    pub link: String,

    /// Index URL with the link appended
    pub subpage_url: String,

    /// What happened, or why it failed
    pub outcome: Result<LinkOutcome, HarvestError>,
}

impl LinkReport {
    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }
}

/// Everything a crawl run did
#[derive(Debug, Default)]
pub struct CrawlReport {
    /// Stale partials removed before the run
    pub sweep: SweepReport,

    /// One entry per candidate link, in index page order
    pub links: Vec<LinkReport>,

    /// Total wall-clock time of the run
    pub elapsed: Duration,
}

/// Counts derived from a `CrawlReport`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStatistics {
    pub candidates: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub not_found: usize,
    pub failed: usize,
    pub bytes: u64,
}

impl CrawlReport {
    /// Tallies the link outcomes
    pub fn statistics(&self) -> RunStatistics {
        let mut stats = RunStatistics {
            candidates: self.links.len(),
            ..RunStatistics::default()
        };

        for entry in &self.links {
            match &entry.outcome {
                Ok(LinkOutcome::Downloaded { bytes, .. }) => {
                    stats.downloaded += 1;
                    stats.bytes += bytes;
                }
                Ok(LinkOutcome::AlreadyPresent { .. }) => stats.already_present += 1,
                Ok(LinkOutcome::NotFound { .. }) => stats.not_found += 1,
                Err(_) => stats.failed += 1,
            }
        }

        stats
    }

    /// Links whose processing failed
    pub fn failures(&self) -> impl Iterator<Item = &LinkReport> {
        self.links.iter().filter(|entry| entry.is_failure())
    }
}

/// Prints a run summary to stdout
pub fn print_report(report: &CrawlReport) {
    let stats = report.statistics();

    println!("=== Harvest Summary ===\n");

    if !report.sweep.removed.is_empty() {
        println!("Stale partials removed: {}", report.sweep.removed.len());
    }
    if !report.sweep.is_clean() {
        println!("Stale partials left behind:");
        for (path, reason) in &report.sweep.failed {
            println!("  {} : {}", path.display(), reason);
        }
    }

    println!("Candidate links: {}", stats.candidates);
    println!("  Downloaded: {} ({} bytes)", stats.downloaded, stats.bytes);
    println!("  Already present: {}", stats.already_present);
    println!("  Not a subpage: {}", stats.not_found);
    println!("  Failed: {}", stats.failed);

    let saved: Vec<_> = report
        .links
        .iter()
        .filter_map(|entry| entry.outcome.as_ref().ok())
        .filter(|outcome| outcome.is_downloaded())
        .filter_map(|outcome| outcome.destination())
        .collect();
    if !saved.is_empty() {
        println!("\nSaved files:");
        for path in saved {
            println!("  {}", path.display());
        }
    }

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!("\nFailed links:");
        for entry in failures {
            if let Err(e) = &entry.outcome {
                println!("  #{} {} : {}", entry.position, entry.subpage_url, e);
            }
        }
    }
    println!();
}

/// Prints manifest records to stdout
pub fn print_manifest(records: &[DownloadRecord]) {
    println!("=== Download Manifest ({}) ===\n", records.len());

    for record in records {
        println!(
            "  {}  {} bytes  run {}  {}",
            record.file_name, record.bytes, record.run_id, record.downloaded_at
        );
        println!("    from {}", record.source_url);
    }
}
