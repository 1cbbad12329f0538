// src/services/confluence.rs

//! Confluence content API client.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::{ExportViewResponse, ListingPage, PageDescriptor};
use crate::utils::http::fetch_json;

/// Read access to a paginated wiki content API.
#[async_trait]
pub trait ContentApi: Send + Sync {
    /// Fetch one page of the content listing.
    async fn fetch_listing(&self, url: &str) -> Result<ListingPage>;

    /// Fetch the rendered export-view HTML of one page.
    async fn fetch_export_view(&self, page: &PageDescriptor) -> Result<String>;
}

/// `ContentApi` backed by the Confluence REST API over HTTP.
#[derive(Clone)]
pub struct HttpContentApi {
    client: Client,
}

impl HttpContentApi {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentApi for HttpContentApi {
    async fn fetch_listing(&self, url: &str) -> Result<ListingPage> {
        fetch_json(&self.client, url).await
    }

    async fn fetch_export_view(&self, page: &PageDescriptor) -> Result<String> {
        let url = page.export_view_url();
        log::debug!("Fetching page {} ({})", page.id, url);
        let response: ExportViewResponse = fetch_json(&self.client, &url).await?;
        Ok(response.into_html())
    }
}
