use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Book-Harvest
///
/// Every table is optional; a missing file or table falls back to the
/// defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub download: DownloadConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Where the books are listed and how subpages expose them
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// The index page; candidate links are appended to this string
    #[serde(rename = "index-url")]
    pub index_url: String,

    /// CSS selector of the button whose `onclick` carries the file path
    #[serde(rename = "download-button-selector")]
    pub download_button_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            index_url: "https://goalkicker.com/".to_string(),
            download_button_selector: "#footer > button".to_string(),
        }
    }
}

/// Local destination configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Directory the books are written to
    #[serde(rename = "destination-dir")]
    pub destination_dir: PathBuf,

    /// Suffix appended to in-flight downloads (without the leading dot)
    #[serde(rename = "partial-suffix")]
    pub partial_suffix: String,

    /// Optional SQLite manifest recording completed downloads
    #[serde(rename = "manifest-path")]
    pub manifest_path: Option<PathBuf>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            destination_dir: PathBuf::from("CodeBooks"),
            partial_suffix: "tmp".to_string(),
            manifest_path: None,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Timeout for index and subpage requests (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Timeout for establishing a connection (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Timeout for a whole file transfer (seconds)
    #[serde(rename = "download-timeout-secs")]
    pub download_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("book-harvest/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            download_timeout_secs: 600,
        }
    }
}

impl DownloadConfig {
    /// The partial suffix without any leading dots
    pub fn normalized_suffix(&self) -> &str {
        self.partial_suffix.trim_start_matches('.')
    }
}
