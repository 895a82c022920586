//! Crawler coordinator - main crawl orchestration logic
//!
//! This module sequences one crawl run:
//! - Preparing the destination directory and sweeping stale partials
//! - Fetching the index page and extracting candidate links
//! - Resolving, gating and fetching each link in turn
//! - Isolating per-link failures so one bad subpage never aborts the run

use crate::config::{validate, Config};
use crate::crawler::fetcher::{build_http_client, download_file, fetch_page, FetchResult};
use crate::crawler::parser::extract_links;
use crate::crawler::resolver::{Resolution, SubpageDescriptor, SubpageResolver};
use crate::download::{destination_path, should_download, sweep};
use crate::output::{CrawlReport, LinkReport};
use crate::state::{CrawlPhase, LinkOutcome};
use crate::storage::{Manifest, RunStatus, SqliteManifest};
use crate::HarvestError;
use reqwest::Client;
use std::path::Path;
use std::time::{Duration, Instant};

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    client: Client,
    resolver: SubpageResolver,
    manifest: Option<SqliteManifest>,
    config_hash: String,
    run_id: Option<i64>,
    phase: CrawlPhase,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Configuration is valid and the client is built
    /// * `Err(HarvestError)` - Invalid configuration or client setup failure
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        validate(&config)?;

        let client = build_http_client(&config.http)?;
        let resolver = SubpageResolver::new(
            client.clone(),
            &config.site,
            Duration::from_secs(config.http.request_timeout_secs),
        )?;

        Ok(Self {
            config,
            client,
            resolver,
            manifest: None,
            config_hash: String::new(),
            run_id: None,
            phase: CrawlPhase::Init,
        })
    }

    /// Attaches the configuration file hash recorded with manifest runs
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    /// The phase the run is currently in
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Runs the crawl to completion
    ///
    /// Only a failure to prepare the destination directory or to fetch the
    /// index page is returned as an error. Everything that goes wrong with a
    /// single link is recorded in that link's `LinkReport`. A coordinator can
    /// be run again; each call starts a fresh run from `CrawlPhase::Init`.
    pub async fn run(&mut self) -> Result<CrawlReport, HarvestError> {
        self.reset();

        let start_time = Instant::now();
        let mut report = CrawlReport::default();
        let directory = self.config.download.destination_dir.clone();

        if prepare_destination(&directory)? {
            self.enter(CrawlPhase::Sweep)?;
            report.sweep = sweep(&directory, self.config.download.normalized_suffix());
        }

        self.open_manifest();

        self.enter(CrawlPhase::Discover)?;
        let links = match self.discover().await {
            Ok(links) => links,
            Err(e) => {
                self.finish_manifest_run(RunStatus::Failed, &report);
                return Err(e);
            }
        };
        tracing::info!(
            "Found {} candidate links on {}",
            links.len(),
            self.config.site.index_url
        );

        for (index, link) in links.into_iter().enumerate() {
            self.enter(CrawlPhase::Resolve)?;

            let subpage_url = format!("{}{}", self.config.site.index_url, link);
            let outcome = self.process_link(&subpage_url).await;

            match &outcome {
                Ok(result) => {
                    tracing::debug!("Link #{} {}: {}", index + 1, result.label(), subpage_url)
                }
                Err(e) => tracing::error!("Error navigating to link: {} : {}", subpage_url, e),
            }

            report.links.push(LinkReport {
                position: index + 1,
                link,
                subpage_url,
                outcome,
            });
        }

        self.enter(CrawlPhase::Done)?;
        report.elapsed = start_time.elapsed();
        self.finish_manifest_run(RunStatus::Completed, &report);

        let stats = report.statistics();
        tracing::info!(
            "Crawl completed: {} downloaded, {} already present, {} failed in {:.2}s",
            stats.downloaded,
            stats.already_present,
            stats.failed,
            report.elapsed.as_secs_f64()
        );

        Ok(report)
    }

    /// Fetches the index page and extracts its links
    async fn discover(&self) -> Result<Vec<String>, HarvestError> {
        let index_url = &self.config.site.index_url;
        let timeout = Duration::from_secs(self.config.http.request_timeout_secs);

        match fetch_page(&self.client, index_url, timeout).await? {
            FetchResult::Success { final_url, body } => {
                if final_url != *index_url {
                    tracing::debug!("Index page redirected to {}", final_url);
                }
                Ok(extract_links(&body))
            }
            FetchResult::HttpStatus { status_code } => Err(HarvestError::Status {
                url: index_url.clone(),
                status: status_code,
            }),
        }
    }

    /// Processes a single candidate link
    ///
    /// This method:
    /// 1. Resolves the subpage to a download URL
    /// 2. Computes the destination path
    /// 3. Consults the download gate
    /// 4. Fetches the file and records it in the manifest
    async fn process_link(&mut self, subpage_url: &str) -> Result<LinkOutcome, HarvestError> {
        let descriptor = match self.resolver.resolve(subpage_url).await? {
            Resolution::Found(descriptor) => descriptor,
            Resolution::NotFound { status } => return Ok(LinkOutcome::NotFound { status }),
        };

        let destination = destination_path(
            &self.config.download.destination_dir,
            &descriptor.download_url,
        )?;

        self.enter(CrawlPhase::Gate)?;
        tracing::info!(
            "Downloading {} to {}",
            descriptor.download_url,
            destination.display()
        );

        if !should_download(&destination) {
            tracing::info!("File already downloaded!");
            return Ok(LinkOutcome::AlreadyPresent { destination });
        }

        self.enter(CrawlPhase::Fetch)?;
        let bytes = download_file(
            &self.client,
            descriptor.download_url.as_str(),
            &destination,
            self.config.download.normalized_suffix(),
            Duration::from_secs(self.config.http.download_timeout_secs),
        )
        .await?;
        tracing::info!("Saved {} ({} bytes)", destination.display(), bytes);

        self.record_download(&descriptor, &destination, bytes);

        Ok(LinkOutcome::Downloaded { destination, bytes })
    }

    /// Drops per-run state left over from a previous `run`
    fn reset(&mut self) {
        if !self.phase.is_terminal() && self.phase != CrawlPhase::Init {
            tracing::warn!("Restarting crawl from phase {}", self.phase);
        }

        self.phase = CrawlPhase::Init;
        self.manifest = None;
        self.run_id = None;
    }

    /// Moves the phase machine forward
    fn enter(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::trace!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Opens the manifest and starts a run record, if one is configured
    fn open_manifest(&mut self) {
        let Some(path) = self.config.download.manifest_path.clone() else {
            return;
        };

        let mut manifest = match SqliteManifest::new(&path) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!("Manifest {} unavailable: {}", path.display(), e);
                return;
            }
        };

        match manifest.create_run(&self.config_hash) {
            Ok(run_id) => {
                tracing::debug!("Recording run {} in {}", run_id, path.display());
                self.run_id = Some(run_id);
                self.manifest = Some(manifest);
            }
            Err(e) => tracing::warn!("Failed to start manifest run: {}", e),
        }
    }

    fn record_download(&mut self, descriptor: &SubpageDescriptor, destination: &Path, bytes: u64) {
        let (Some(manifest), Some(run_id)) = (self.manifest.as_mut(), self.run_id) else {
            return;
        };

        let file_name = destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        if let Err(e) = manifest.record_download(
            run_id,
            &file_name,
            descriptor.download_url.as_str(),
            &destination.to_string_lossy(),
            bytes,
        ) {
            tracing::warn!("Failed to record {} in manifest: {}", file_name, e);
        }
    }

    fn finish_manifest_run(&mut self, status: RunStatus, report: &CrawlReport) {
        let (Some(manifest), Some(run_id)) = (self.manifest.as_mut(), self.run_id) else {
            return;
        };

        let stats = report.statistics();
        if let Err(e) = manifest.finish_run(
            run_id,
            status,
            stats.downloaded as u64,
            stats.failed as u64,
        ) {
            tracing::warn!("Failed to finish manifest run {}: {}", run_id, e);
        }
    }
}

/// Makes sure the destination directory exists
///
/// # Returns
///
/// * `Ok(true)` - The directory already existed and should be swept
/// * `Ok(false)` - The directory was just created
/// * `Err(HarvestError::CreateDir)` - It could not be created, or the path is
///   taken by something that is not a directory
fn prepare_destination(directory: &Path) -> Result<bool, HarvestError> {
    if directory.is_dir() {
        return Ok(true);
    }

    if directory.exists() {
        return Err(HarvestError::CreateDir {
            path: directory.display().to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "path exists and is not a directory",
            ),
        });
    }

    std::fs::create_dir_all(directory).map_err(|source| HarvestError::CreateDir {
        path: directory.display().to_string(),
        source,
    })?;
    tracing::info!("Created destination directory {}", directory.display());

    Ok(false)
}

/// Runs the main crawl operation
///
/// # Example
///
/// ```no_run
/// use book_harvest::config::Config;
/// use book_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default()).await?;
/// println!("{} links processed", report.links.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, HarvestError> {
    let mut coordinator = Coordinator::new(config)?;
    coordinator.run().await
}
