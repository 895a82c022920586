//! Crawler module for book discovery and retrieval
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching of pages and streaming file transfers
//! - HTML parsing for index links and download buttons
//! - Subpage resolution to download URLs
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod resolver;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, download_file, fetch_page, FetchResult};
pub use parser::{extract_download_attribute, extract_links, parse_download_path, ONCLICK_PREFIX};
pub use resolver::{Resolution, SubpageDescriptor, SubpageResolver};
