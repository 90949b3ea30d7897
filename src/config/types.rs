use serde::Deserialize;

use crate::output::{OutputFormat, SortOrder};

/// Events page crawled when no URL is configured
pub const DEFAULT_GROUP_URL: &str = "https://www.meetup.com/orange-county-ai/events/";

/// Desktop Chrome user agent presented to the site
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

pub const DEFAULT_REFERER: &str = "https://www.meetup.com/";

pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Main configuration structure for Meetup-Events
///
/// Every section is optional; a missing file section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub group: GroupConfig,
    pub http: HttpConfig,
    pub output: OutputConfig,
}

/// Which group to crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Absolute URL of the group's events page
    pub url: String,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GROUP_URL.to_string(),
        }
    }
}

/// Request identity and transport settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub referer: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Whole-request timeout in seconds; the client default when unset
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout_secs: None,
        }
    }
}

/// Presentation of the crawled events
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Date order, office hours always sorting last in ascending order
    pub sort: SortOrder,

    /// Maximum number of events printed
    pub limit: Option<usize>,

    pub format: OutputFormat,
}
