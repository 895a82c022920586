//! Configuration module for Book-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file targets the stock site
//! and the `CodeBooks` directory.
//!
//! # Example
//!
//! ```no_run
//! use book_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Books go to: {}", config.download.destination_dir.display());
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, DownloadConfig, HttpConfig, SiteConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
