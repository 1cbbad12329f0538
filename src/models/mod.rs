// src/models/mod.rs

//! Domain models for the mirror.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod content;

// Re-export all public types
pub use config::{Config, CrawlerConfig, GitConfig, OutputConfig, SourceConfig};
pub use content::{
    BodyValue, ContentBody, ExportViewResponse, ListingLinks, ListingPage, PageDescriptor,
    PageLinks,
};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of the version-control finalize step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// Changes were committed (and pushed, when enabled)
    Committed { pushed: bool },
    /// Staging produced no changes; earlier unpushed commits were pushed
    /// when `pushed` is set
    NothingToCommit { pushed: bool },
    /// The finalize step is disabled by configuration
    Skipped,
}

/// Statistics for one mirror run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Listing pages fetched
    pub listing_pages: usize,
    /// Page files written
    pub pages_written: usize,
    pub publish: PublishOutcome,
}
