//! In-memory collaborators for pipeline tests.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{ListingLinks, ListingPage, PageDescriptor, PageLinks, PublishOutcome};
use crate::services::{ContentApi, Publisher};

pub const BASE: &str = "https://wiki.test";

/// Descriptor for page `id` under `/display/T/`.
pub fn descriptor(id: &str) -> PageDescriptor {
    PageDescriptor {
        id: id.to_string(),
        kind: "page".to_string(),
        status: "current".to_string(),
        title: format!("Page {id}"),
        links: PageLinks {
            self_link: format!("{BASE}/rest/api/content/{id}"),
            webui: format!("/display/T/{id}"),
            tinyui: None,
            editui: None,
        },
    }
}

/// Listing page with the given results and relative `next` cursor.
pub fn listing(next: Option<&str>, ids: &[&str]) -> ListingPage {
    ListingPage {
        links: ListingLinks {
            base: BASE.to_string(),
            context: String::new(),
            next: next.map(str::to_string),
            self_link: format!("{BASE}/rest/api/content"),
        },
        limit: 25,
        size: ids.len(),
        start: 0,
        results: ids.iter().map(|id| descriptor(id)).collect(),
    }
}

/// Count `.html` files below a directory.
pub fn count_html_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_html_files(&path)
            } else if path.extension().is_some_and(|ext| ext == "html") {
                1
            } else {
                0
            }
        })
        .sum()
}

/// Scripted `ContentApi`.
#[derive(Default)]
pub struct FakeApi {
    listings: HashMap<String, ListingPage>,
    bodies: HashMap<String, String>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    delay: Option<Duration>,
    watch_dir: Option<PathBuf>,
    listing_requests: Mutex<Vec<String>>,
    content_requests: Mutex<Vec<String>>,
    /// Page files present under `watch_dir` at each listing request
    pub files_at_listing: Mutex<Vec<usize>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_listing(mut self, url: &str, page: ListingPage) -> Self {
        self.listings.insert(url.to_string(), page);
        self
    }

    pub fn with_body(mut self, id: &str, html: &str) -> Self {
        self.bodies.insert(id.to_string(), html.to_string());
        self
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn hanging(mut self, id: &str) -> Self {
        self.hanging.insert(id.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn watching(mut self, dir: &Path) -> Self {
        self.watch_dir = Some(dir.to_path_buf());
        self
    }

    pub fn listing_requests(&self) -> Vec<String> {
        self.listing_requests.lock().unwrap().clone()
    }

    pub fn content_requests(&self) -> Vec<String> {
        self.content_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentApi for FakeApi {
    async fn fetch_listing(&self, url: &str) -> Result<ListingPage> {
        self.listing_requests.lock().unwrap().push(url.to_string());
        if let Some(dir) = &self.watch_dir {
            self.files_at_listing
                .lock()
                .unwrap()
                .push(count_html_files(dir));
        }
        self.listings
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::fetch(url, "404 Not Found"))
    }

    async fn fetch_export_view(&self, page: &PageDescriptor) -> Result<String> {
        self.content_requests.lock().unwrap().push(page.id.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.hanging.contains(&page.id) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(&page.id) {
            return Err(AppError::fetch(
                page.export_view_url(),
                "500 Internal Server Error",
            ));
        }
        Ok(self
            .bodies
            .get(&page.id)
            .cloned()
            .unwrap_or_else(|| format!("<p>page {}</p>", page.id)))
    }
}

/// `Publisher` that records calls.
#[derive(Default)]
pub struct FakePublisher {
    pub messages: Mutex<Vec<String>>,
}

impl FakePublisher {
    pub fn calls(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

#[async_trait]
impl Publisher for FakePublisher {
    async fn publish(&self, message: &str) -> Result<PublishOutcome> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(PublishOutcome::Committed { pushed: true })
    }
}
