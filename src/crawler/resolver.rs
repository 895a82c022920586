//! Subpage resolution
//!
//! A candidate link is only interesting if it leads to a book subpage. The
//! resolver fetches the subpage and turns its download button into an
//! absolute file URL.

use crate::config::SiteConfig;
use crate::crawler::fetcher::{fetch_page, FetchResult};
use crate::crawler::parser::{extract_download_attribute, parse_download_path};
use crate::{ConfigError, HarvestError};
use reqwest::Client;
use scraper::Selector;
use std::time::Duration;
use url::Url;

/// A subpage that answered 200 and exposed a download path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpageDescriptor {
    /// The subpage URL as requested
    pub subpage_url: String,

    /// The path fragment taken from the button handler
    pub download_path: String,

    /// Subpage URL with the path fragment appended
    pub download_url: Url,
}

/// Outcome of resolving one candidate link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The link is a book subpage
    Found(SubpageDescriptor),

    /// The link answered with a non-200 status
    NotFound { status: u16 },
}

/// Resolves candidate subpage URLs to download URLs
pub struct SubpageResolver {
    client: Client,
    selector: Selector,
    selector_text: String,
    timeout: Duration,
}

impl SubpageResolver {
    /// Creates a resolver for the configured download button selector
    ///
    /// # Returns
    ///
    /// * `Ok(SubpageResolver)` - Ready to resolve
    /// * `Err(ConfigError::InvalidSelector)` - The selector does not parse
    pub fn new(client: Client, site: &SiteConfig, timeout: Duration) -> Result<Self, ConfigError> {
        let selector = Selector::parse(&site.download_button_selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("'{}': {:?}", site.download_button_selector, e))
        })?;

        Ok(Self {
            client,
            selector,
            selector_text: site.download_button_selector.clone(),
            timeout,
        })
    }

    /// Fetches a subpage and extracts its download URL
    ///
    /// # Returns
    ///
    /// * `Ok(Resolution::Found)` - HTTP 200 and a parsable download button
    /// * `Ok(Resolution::NotFound)` - Any other HTTP status
    /// * `Err(HarvestError::Http)` - Network failure
    /// * `Err(HarvestError::Extraction)` - Button or attribute missing or malformed
    /// * `Err(HarvestError::UrlParse)` - The joined download URL is not a URL
    pub async fn resolve(&self, subpage_url: &str) -> Result<Resolution, HarvestError> {
        match fetch_page(&self.client, subpage_url, self.timeout).await? {
            FetchResult::HttpStatus { status_code } => {
                tracing::debug!("{} answered HTTP {}, skipping", subpage_url, status_code);
                Ok(Resolution::NotFound {
                    status: status_code,
                })
            }
            FetchResult::Success { body, .. } => {
                let descriptor = self.describe(subpage_url, &body)?;
                Ok(Resolution::Found(descriptor))
            }
        }
    }

    /// Builds a descriptor from an already fetched subpage body
    pub fn describe(&self, subpage_url: &str, body: &str) -> Result<SubpageDescriptor, HarvestError> {
        let onclick = extract_download_attribute(body, &self.selector, &self.selector_text)?;
        let download_path = parse_download_path(&onclick)?;

        // The site scopes file paths to the subpage's own directory
        let download_url = Url::parse(&format!("{}{}", subpage_url, download_path))?;

        Ok(SubpageDescriptor {
            subpage_url: subpage_url.to_string(),
            download_path,
            download_url,
        })
    }
}
