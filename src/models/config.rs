//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote wiki endpoint settings
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP and fan-out behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Output tree settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Version-control finalize settings
    #[serde(default)]
    pub git: GitConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.source.base_url)
            .map_err(|e| AppError::validation(format!("source.base_url is invalid: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(AppError::validation(
                "source.base_url must use http or https",
            ));
        }
        if !self.source.listing_path.starts_with('/') {
            return Err(AppError::validation(
                "source.listing_path must start with '/'",
            ));
        }
        if self.source.page_size == 0 {
            return Err(AppError::validation("source.page_size must be > 0"));
        }
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.output.dir.as_os_str().is_empty() {
            return Err(AppError::validation("output.dir is empty"));
        }
        if self.git.enabled && self.git.push {
            if self.git.remote.trim().is_empty() {
                return Err(AppError::validation("git.remote is empty"));
            }
            if self.git.branch.trim().is_empty() {
                return Err(AppError::validation("git.branch is empty"));
            }
        }
        Ok(())
    }
}

/// Remote wiki endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Scheme and host of the wiki, prepended to relative `next` cursors
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Path of the content listing endpoint
    #[serde(default = "defaults::listing_path")]
    pub listing_path: String,

    /// Number of results requested per listing page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,
}

impl SourceConfig {
    /// URL of the first listing page.
    pub fn start_url(&self) -> String {
        format!(
            "{}{}?limit={}",
            self.base_url.trim_end_matches('/'),
            self.listing_path,
            self.page_size
        )
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            listing_path: defaults::listing_path(),
            page_size: defaults::page_size(),
        }
    }
}

/// HTTP client and fan-out behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds (0 disables the timeout)
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum page pipelines in flight within one listing batch
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Output tree settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root of the mirrored tree (also the git working directory)
    #[serde(default = "defaults::output_dir")]
    pub dir: PathBuf,

    /// Mode for created directories (unix only)
    #[serde(default = "defaults::dir_mode")]
    pub dir_mode: u32,

    /// Mode for written page files (unix only)
    #[serde(default = "defaults::file_mode")]
    pub file_mode: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            dir_mode: defaults::dir_mode(),
            file_mode: defaults::file_mode(),
        }
    }
}

/// Version-control finalize settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Run the stage/commit step after the mirror completes
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    /// Push the commit to the remote
    #[serde(default = "defaults::enabled")]
    pub push: bool,

    #[serde(default = "defaults::remote")]
    pub remote: String,

    #[serde(default = "defaults::branch")]
    pub branch: String,

    /// Commit message prefix, followed by the run timestamp
    #[serde(default = "defaults::message_prefix")]
    pub message_prefix: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            push: defaults::enabled(),
            remote: defaults::remote(),
            branch: defaults::branch(),
            message_prefix: defaults::message_prefix(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn base_url() -> String {
        "https://wiki.nci.nih.gov".into()
    }
    pub fn listing_path() -> String {
        "/rest/api/content".into()
    }
    pub fn page_size() -> usize {
        25
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        concat!("wikidump/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        25
    }

    // Output defaults
    pub fn output_dir() -> PathBuf {
        PathBuf::from("/tmp/confluence_dump")
    }
    pub fn dir_mode() -> u32 {
        0o755
    }
    pub fn file_mode() -> u32 {
        0o644
    }

    // Git defaults
    pub fn enabled() -> bool {
        true
    }
    pub fn remote() -> String {
        "origin".into()
    }
    pub fn branch() -> String {
        "main".into()
    }
    pub fn message_prefix() -> String {
        "wiki dump on".into()
    }
}
