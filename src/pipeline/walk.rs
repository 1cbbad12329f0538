// src/pipeline/walk.rs

//! Sequential walk over the paginated content listing.

use std::collections::HashSet;
use std::future::Future;

use crate::error::{AppError, Result};
use crate::models::ListingPage;
use crate::services::ContentApi;

/// Follows `next` cursors from a start URL until the listing is exhausted.
pub struct ListWalker<'a> {
    api: &'a dyn ContentApi,
    base_url: &'a str,
}

impl<'a> ListWalker<'a> {
    /// `base_url` is what relative `next` cursors are joined onto.
    pub fn new(api: &'a dyn ContentApi, base_url: &'a str) -> Self {
        Self { api, base_url }
    }

    /// Fetch listing pages one at a time, awaiting `on_page` for each before
    /// requesting the next. Returns the number of listing pages fetched.
    ///
    /// Any listing error, handler error, or revisited cursor ends the walk.
    pub async fn walk<F, Fut>(&self, start_url: &str, mut on_page: F) -> Result<usize>
    where
        F: FnMut(ListingPage) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut visited = HashSet::new();
        let mut next = Some(start_url.to_string());
        let mut fetched = 0;

        while let Some(url) = next.take() {
            if !visited.insert(url.clone()) {
                return Err(AppError::PaginationCycle(url));
            }

            log::info!("listing {}", url);
            let listing = self.api.fetch_listing(&url).await?;
            fetched += 1;
            log::debug!(
                "Listing page {}: start={} size={}",
                fetched,
                listing.start,
                listing.size
            );

            next = listing.next_url(self.base_url);
            on_page(listing).await?;
        }

        Ok(fetched)
    }
}
