//! Crawl coordinator - listing discovery followed by per-event extraction
//!
//! A crawl is strictly sequential and fail-fast: every page is fetched and
//! extracted in listing order, and the first failure ends the crawl with no
//! partial result.

use std::path::Path;

use url::Url;

use crate::crawler::PageFetcher;
use crate::diagnostics::dump_state_tree;
use crate::event::MeetupEvent;
use crate::extract::{extract_event, extract_event_urls};
use crate::Result;

/// Crawls a group's events through an injected [`PageFetcher`]
#[derive(Debug, Clone)]
pub struct Crawler<F> {
    fetcher: F,
}

impl<F: PageFetcher> Crawler<F> {
    /// Creates a crawler around a fetcher
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// The fetcher every page is read through
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Runs a full crawl of a group's events page
    ///
    /// # Arguments
    ///
    /// * `listing_url` - Absolute URL of the group's events page
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<MeetupEvent>)` - One record per discovered event, in listing order
    /// * `Err(ScrapeError)` - The first fetch or extraction failure
    pub async fn crawl(&self, listing_url: &str) -> Result<Vec<MeetupEvent>> {
        let event_urls = self.discover(listing_url).await?;
        tracing::info!("Found {} upcoming events", event_urls.len());

        let mut events = Vec::with_capacity(event_urls.len());
        for url in &event_urls {
            events.push(self.fetch_event(url).await?);
        }

        Ok(events)
    }

    /// Fetches the events page and returns absolute event URLs in page order
    ///
    /// Relative links (possible on the DOM fallback path) are resolved against
    /// `listing_url`.
    pub async fn discover(&self, listing_url: &str) -> Result<Vec<String>> {
        let base = Url::parse(listing_url)?;

        tracing::info!("Fetching events from {}", listing_url);
        let html = self.fetcher.fetch(listing_url).await?;
        let links = extract_event_urls(&html)?;

        let urls = links
            .iter()
            .map(|link| base.join(link).map(String::from))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(urls)
    }

    /// Fetches one event page and extracts its record
    pub async fn fetch_event(&self, url: &str) -> Result<MeetupEvent> {
        tracing::info!("Fetching event details from {}", url);
        let html = self.fetcher.fetch(url).await?;
        let event = extract_event(&html)?;
        tracing::debug!("Extracted '{}' ({})", event.name, event.date);
        Ok(event)
    }

    /// Fetches a page and dumps its embedded state tree to `path`
    ///
    /// Fetch failures propagate; the dump itself is best effort and reports
    /// whether a file was written.
    pub async fn dump_page(&self, url: &str, path: &Path) -> Result<bool> {
        let html = self.fetcher.fetch(url).await?;
        Ok(dump_state_tree(&html, path))
    }
}
