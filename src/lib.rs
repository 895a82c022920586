//! Book-Harvest: a two-level book crawler
//!
//! This crate walks a single aggregator index page, resolves every linked
//! subpage to the file behind its download button, and fetches each file once
//! into a local directory. Files already present are skipped and partial
//! downloads from interrupted runs are swept before a new run starts.

pub mod config;
pub mod crawler;
pub mod download;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Book-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to create destination directory {path}: {source}")]
    CreateDir {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid crawl phase transition: {from} -> {to}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// Errors raised while pulling the download path out of a subpage
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("No onclick attribute found for selector '{selector}'")]
    MissingAttribute { selector: String },

    #[error("Expected 'location.href=' prefix in '{value}'")]
    MissingPrefix { value: String },

    #[error("Download path is empty")]
    EmptyPath,

    #[error("No file name in download URL {url}")]
    NoFileName { url: String },
}

/// Result type alias for Book-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Coordinator};
pub use state::LinkOutcome;
