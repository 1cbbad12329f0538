// src/pipeline/page.rs

//! Per-page pipeline: fetch, sanitize, write.

use std::path::PathBuf;

use futures::stream::{self, TryStreamExt};

use crate::error::{AppError, Result};
use crate::models::PageDescriptor;
use crate::services::{ContentApi, Sanitizer};
use crate::storage::PageStorage;

/// Fetch -> sanitize -> write for single pages and for listing batches.
pub struct PagePipeline<'a> {
    api: &'a dyn ContentApi,
    sanitizer: &'a Sanitizer,
    storage: &'a dyn PageStorage,
    max_concurrent: usize,
}

impl<'a> PagePipeline<'a> {
    pub fn new(
        api: &'a dyn ContentApi,
        sanitizer: &'a Sanitizer,
        storage: &'a dyn PageStorage,
        max_concurrent: usize,
    ) -> Self {
        Self {
            api,
            sanitizer,
            storage,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Mirror one page, returning the written path.
    pub async fn run(&self, base_url: &str, page: &PageDescriptor) -> Result<PathBuf> {
        let raw = self.api.fetch_export_view(page).await?;
        let clean = self.sanitizer.sanitize(&raw);
        self.storage.write_page(base_url, page, &clean).await
    }

    /// Mirror a batch of pages concurrently.
    ///
    /// Fails fast: the first error is returned and pipelines still in flight
    /// are dropped at their next suspension point.
    pub async fn run_batch(&self, base_url: &str, pages: &[PageDescriptor]) -> Result<usize> {
        stream::iter(pages.iter().map(Ok::<_, AppError>))
            .try_for_each_concurrent(self.max_concurrent, |page| async move {
                self.run(base_url, page)
                    .await
                    .map(|_| ())
                    .inspect_err(|e| {
                        log::error!("Page {} ({:?}) failed: {}", page.id, page.title, e)
                    })
            })
            .await?;
        Ok(pages.len())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::pipeline::testing::{BASE, FakeApi, count_html_files, descriptor};
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_run_writes_sanitized_page() {
        let tmp = TempDir::new().unwrap();
        let api = FakeApi::new().with_body(
            "42",
            r#"<script>track()</script><p class="x">Hello <a href="/y" onclick="z()">there</a></p>"#,
        );
        let sanitizer = Sanitizer::default();
        let storage = LocalStorage::new(tmp.path());
        let pipeline = PagePipeline::new(&api, &sanitizer, &storage, 4);

        let path = pipeline.run(BASE, &descriptor("42")).await.unwrap();

        assert_eq!(path, tmp.path().join("wiki.test/display/T/42.html"));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "<p>Hello <a href=\"/y\">there</a></p>\n"
        );
    }

    #[tokio::test]
    async fn test_batch_writes_every_page() {
        let tmp = TempDir::new().unwrap();
        let api = FakeApi::new();
        let sanitizer = Sanitizer::default();
        let storage = LocalStorage::new(tmp.path());
        let pipeline = PagePipeline::new(&api, &sanitizer, &storage, 25);

        let pages: Vec<_> = ["1", "2", "3", "4", "5"].map(descriptor).to_vec();
        let written = pipeline.run_batch(BASE, &pages).await.unwrap();

        assert_eq!(written, 5);
        assert_eq!(count_html_files(tmp.path()), 5);
    }

    #[tokio::test]
    async fn test_batch_respects_concurrency_bound() {
        let tmp = TempDir::new().unwrap();
        let api = FakeApi::new().with_delay(Duration::from_millis(20));
        let sanitizer = Sanitizer::default();
        let storage = LocalStorage::new(tmp.path());
        let pipeline = PagePipeline::new(&api, &sanitizer, &storage, 2);

        let pages: Vec<_> = ["1", "2", "3", "4", "5", "6"].map(descriptor).to_vec();
        pipeline.run_batch(BASE, &pages).await.unwrap();

        let max = api.max_in_flight.load(std::sync::atomic::Ordering::SeqCst);
        assert_eq!(max, 2);
        assert_eq!(api.content_requests().len(), 6);
    }

    #[tokio::test]
    async fn test_batch_fails_fast_and_cancels_siblings() {
        let tmp = TempDir::new().unwrap();
        let api = FakeApi::new().failing("2").hanging("1").hanging("3");
        let sanitizer = Sanitizer::default();
        let storage = LocalStorage::new(tmp.path());
        let pipeline = PagePipeline::new(&api, &sanitizer, &storage, 25);

        let pages: Vec<_> = ["1", "2", "3"].map(descriptor).to_vec();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            pipeline.run_batch(BASE, &pages),
        )
        .await
        .expect("batch should not wait for hanging siblings");

        assert!(matches!(result, Err(AppError::Fetch { .. })));
        assert_eq!(count_html_files(tmp.path()), 0);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let tmp = TempDir::new().unwrap();
        let api = FakeApi::new();
        let sanitizer = Sanitizer::default();
        let storage = LocalStorage::new(tmp.path());
        let pipeline = PagePipeline::new(&api, &sanitizer, &storage, 25);

        assert_eq!(pipeline.run_batch(BASE, &[]).await.unwrap(), 0);
        assert!(api.content_requests().is_empty());
    }
}
