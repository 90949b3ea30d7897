//! Crawler module for fetching and extracting a group's events
//!
//! This module contains the crawling logic, including:
//! - HTTP fetching with browser-like headers
//! - Listing discovery and per-event extraction
//! - Overall crawl coordination

mod coordinator;
mod fetcher;

pub use coordinator::Crawler;
pub use fetcher::{browser_headers, build_http_client, fetch_page, HttpFetcher, PageFetcher};

use crate::config::Config;
use crate::event::MeetupEvent;
use crate::ScrapeError;

/// Runs a complete crawl of the configured group
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the HTTP client from `config.http`
/// 2. Fetch the group's events page and discover event URLs
/// 3. Fetch and extract every event in listing order
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(Vec<MeetupEvent>)` - All upcoming events, in listing order
/// * `Err(ScrapeError)` - The first failure; no partial results
pub async fn crawl_group(config: &Config) -> Result<Vec<MeetupEvent>, ScrapeError> {
    let fetcher = HttpFetcher::new(&config.http)?;
    Crawler::new(fetcher).crawl(&config.group.url).await
}
