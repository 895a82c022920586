//! Output module for crawl reports
//!
//! This module handles:
//! - Collecting per-link results into a run report
//! - Printing the end-of-run summary
//! - Printing the download manifest

mod report;

pub use report::{print_manifest, print_report, CrawlReport, LinkReport, RunStatistics};
