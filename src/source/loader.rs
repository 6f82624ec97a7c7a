//! Catalogue loading from local files or HTTP(S) endpoints.
//!
//! Remote catalogues are fetched with reqwest; a `t=<millis>` query pair is
//! appended by default so intermediate caches never serve a stale document.

use crate::error::{Result, StatsError};
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where a catalogue comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A JSON file on disk.
    File(PathBuf),
    /// An `http://` or `https://` URL.
    Remote(String),
}

impl InputSource {
    /// Classify an input location. Anything that is not an http(s) URL is a path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            InputSource::Remote(location.to_string())
        } else {
            InputSource::File(PathBuf::from(location))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, InputSource::Remote(_))
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::File(path) => write!(f, "{}", path.display()),
            InputSource::Remote(url) => write!(f, "{}", url),
        }
    }
}

/// Options for loading a catalogue.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Timeout for remote fetches, in seconds.
    pub timeout_seconds: u64,
    /// Append `t=<unix millis>` to remote URLs.
    pub cache_bust: bool,
    /// Show a spinner while fetching.
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            cache_bust: true,
            show_progress: true,
        }
    }
}

/// Load and parse a catalogue document.
pub async fn load_input(source: &InputSource, options: &LoadOptions) -> Result<Value> {
    match source {
        InputSource::File(path) => load_file(path).await,
        InputSource::Remote(url) => fetch_remote(url, options).await,
    }
}

async fn load_file(path: &Path) -> Result<Value> {
    info!("Reading catalogue: {}", path.display());

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StatsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Read {} bytes from {}", content.len(), path.display());
    Ok(serde_json::from_str(&content)?)
}

async fn fetch_remote(url: &str, options: &LoadOptions) -> Result<Value> {
    let target = if options.cache_bust {
        cache_busted_url(url, Utc::now().timestamp_millis())?
    } else {
        parse_url(url)?.to_string()
    };

    info!("Fetching catalogue: {}", target);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(options.timeout_seconds))
        .build()?;

    let spinner = options.show_progress.then(|| fetch_spinner(url));
    let result = fetch_document(&client, &target, options.timeout_seconds).await;

    if let Some(pb) = spinner {
        match result {
            Ok(_) => pb.finish_with_message("Catalogue fetched"),
            Err(_) => pb.abandon_with_message("Fetch failed"),
        }
    }

    result
}

async fn fetch_document(client: &reqwest::Client, url: &str, timeout_seconds: u64) -> Result<Value> {
    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            warn!("Fetch timed out after {}s", timeout_seconds);
        }
        StatsError::Fetch(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(StatsError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.text().await?;
    debug!("Fetched {} bytes", body.len());
    Ok(serde_json::from_str(&body)?)
}

fn fetch_spinner(url: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("Fetching {}", url));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|e| StatsError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

/// Append the `t=<millis>` cache-busting pair, keeping any existing query.
pub fn cache_busted_url(url: &str, millis: i64) -> Result<String> {
    let mut parsed = parse_url(url)?;
    parsed
        .query_pairs_mut()
        .append_pair("t", &millis.to_string());
    Ok(parsed.to_string())
}
