use crate::config::types::{Config, DownloadConfig, HttpConfig, SiteConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_download_config(&config.download)?;
    validate_http_config(&config.http)?;
    Ok(())
}

/// Validates the index URL and the download button selector
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.index_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid index-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "index-url '{}' must use http or https",
            config.index_url
        )));
    }

    // Candidate links are appended verbatim, so the base must end in a slash
    if !config.index_url.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "index-url '{}' must end with '/'",
            config.index_url
        )));
    }

    Selector::parse(&config.download_button_selector).map_err(|e| {
        ConfigError::InvalidSelector(format!(
            "'{}': {:?}",
            config.download_button_selector, e
        ))
    })?;

    Ok(())
}

/// Validates destination directory and partial-file suffix
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.destination_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "destination-dir cannot be empty".to_string(),
        ));
    }

    let suffix = config.normalized_suffix();
    if suffix.is_empty() {
        return Err(ConfigError::Validation(
            "partial-suffix cannot be empty".to_string(),
        ));
    }

    if suffix.contains('/') || suffix.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "partial-suffix '{}' cannot contain path separators",
            config.partial_suffix
        )));
    }

    if let Some(manifest) = &config.manifest_path {
        if manifest.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "manifest-path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates HTTP client settings
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("request-timeout-secs", config.request_timeout_secs),
        ("connect-timeout-secs", config.connect_timeout_secs),
        ("download-timeout-secs", config.download_timeout_secs),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!(
                "{} must be greater than 0",
                name
            )));
        }
    }

    Ok(())
}
