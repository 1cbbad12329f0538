// src/pipeline/sync.rs

//! Mirror run: walk every listing page, then publish once.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Local, Utc};

use crate::error::Result;
use crate::models::{Config, PublishOutcome, SyncReport};
use crate::services::{ContentApi, Publisher, Sanitizer};
use crate::storage::PageStorage;

use super::page::PagePipeline;
use super::walk::ListWalker;

/// Commit message for a run finishing at `now`.
pub fn commit_message(prefix: &str, now: DateTime<Local>) -> String {
    format!("{} {}", prefix, now.format("%Y-%m-%d %H:%M:%S%.f %z"))
}

/// Run the full mirror.
///
/// Every listing page is fetched and its batch written before the next one
/// is requested. The publisher runs exactly once, after the last batch; any
/// earlier error returns before it is reached. With no publisher the
/// finalize step is skipped.
pub async fn run_sync(
    config: &Config,
    api: &dyn ContentApi,
    sanitizer: &Sanitizer,
    storage: &dyn PageStorage,
    publisher: Option<&dyn Publisher>,
) -> Result<SyncReport> {
    let started_at = Utc::now();
    let fallback_base = config.source.base_url.as_str();

    let walker = ListWalker::new(api, fallback_base);
    let pipeline = PagePipeline::new(api, sanitizer, storage, config.crawler.max_concurrent);
    let written = AtomicUsize::new(0);

    let listing_pages = walker
        .walk(&config.source.start_url(), |listing| {
            let pipeline = &pipeline;
            let written = &written;
            async move {
                let base_url = if listing.links.base.is_empty() {
                    fallback_base
                } else {
                    listing.links.base.as_str()
                };
                let count = pipeline.run_batch(base_url, &listing.results).await?;
                let total = written.fetch_add(count, Ordering::Relaxed) + count;
                log::info!("Wrote {} pages ({} total)", count, total);
                Ok(())
            }
        })
        .await?;

    let publish = match publisher {
        Some(publisher) => {
            log::info!("committing");
            let message = commit_message(&config.git.message_prefix, Local::now());
            publisher.publish(&message).await?
        }
        None => {
            log::info!("Skipping commit step");
            PublishOutcome::Skipped
        }
    };

    Ok(SyncReport {
        started_at,
        finished_at: Utc::now(),
        listing_pages,
        pages_written: written.into_inner(),
        publish,
    })
}
