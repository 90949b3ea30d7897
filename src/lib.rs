//! Meetup-Events: a meetup group event scraper
//!
//! This crate crawls a meetup group's event listing, fetches every upcoming
//! event page and extracts a structured [`MeetupEvent`] from each one. Pages
//! are read through their embedded application-state tree first and through
//! the rendered DOM when that tree is missing or reshaped.

pub mod config;
pub mod crawler;
pub mod diagnostics;
pub mod event;
pub mod extract;
pub mod output;

use std::fmt;

use thiserror::Error;

/// Main error type for Meetup-Events operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Page fetch failures. Never retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// The URL that could not be fetched
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. } | Self::Transport { url, .. } => url,
        }
    }
}

/// Failure of a single extraction strategy
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Could not find embedded state script in HTML")]
    MissingStateScript,

    #[error("Embedded state is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Could not find {0} in embedded state")]
    MissingNode(String),

    #[error("Field '{field}' is missing from {node}")]
    MissingField { node: String, field: String },

    #[error("Field '{field}' of {node} is not a usable {expected}")]
    InvalidField {
        node: String,
        field: String,
        expected: &'static str,
    },

    #[error("Invalid date/time '{value}': {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("Failed to parse selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("No element matches '{selector}'")]
    MissingElement { selector: String },
}

/// Which kind of page an extraction ran against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Listing,
    Event,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listing => f.write_str("events page"),
            Self::Event => f.write_str("event page"),
        }
    }
}

/// Both extraction strategies failed on a page
///
/// The primary (structured-data) failure and the fallback (DOM) failure are
/// both kept so the message shows which stage broke.
#[derive(Debug, Error)]
#[error("Failed to parse {page}: {primary}. Fallback error: {fallback}")]
pub struct ExtractionError {
    pub page: PageKind,
    #[source]
    pub primary: StrategyError,
    pub fallback: StrategyError,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Meetup-Events operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl_group, Crawler, HttpFetcher, PageFetcher};
pub use diagnostics::dump_state_tree;
pub use event::{EventDate, MeetupEvent};
pub use extract::{extract_event, extract_event_urls};
