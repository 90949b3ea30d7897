//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building an HTTP client that presents itself as a desktop browser
//! - GET requests for listing and event pages
//! - Classifying failures into [`FetchError`]
//!
//! No retries: a failed fetch aborts the crawl.

use std::future::Future;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;

use crate::config::HttpConfig;
use crate::{ConfigError, FetchError, ScrapeError};

/// Accept header of a desktop Chrome navigation request
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

/// Navigation headers sent with every request, besides the configurable ones
const NAVIGATION_HEADERS: [(&str, &str); 7] = [
    ("connection", "keep-alive"),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "same-origin"),
    ("sec-fetch-user", "?1"),
    ("upgrade-insecure-requests", "1"),
    ("cache-control", "max-age=0"),
];

/// Source of page markup
///
/// The crawler only needs page bodies, so anything that can turn a URL into
/// HTML can stand in for the network (see the test doubles in the crawler
/// tests).
pub trait PageFetcher {
    /// Fetches `url` and returns the response body
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// [`PageFetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher from the HTTP configuration
    pub fn new(config: &HttpConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        fetch_page(&self.client, url).await
    }
}

/// Builds an HTTP client with browser-like default headers
///
/// Compression is negotiated by reqwest itself (gzip and brotli features), so
/// no `Accept-Encoding` header is set here; a manual one would disable
/// transparent decompression.
///
/// # Example
///
/// ```no_run
/// use meetup_events::config::HttpConfig;
/// use meetup_events::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, ScrapeError> {
    let headers = browser_headers(config)?;

    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .gzip(true)
        .brotli(true);

    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    Ok(builder.build()?)
}

/// Default header set mimicking a desktop browser navigation
pub fn browser_headers(config: &HttpConfig) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();

    headers.insert(header::ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header_value("accept-language", &config.accept_language)?,
    );
    headers.insert(header::REFERER, header_value("referer", &config.referer)?);

    for (name, value) in NAVIGATION_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    Ok(headers)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value)
        .map_err(|e| ConfigError::Validation(format!("Invalid {} header '{}': {}", name, value, e)))
}

/// Fetches a URL and returns its body
///
/// # Errors
///
/// | Condition | Error |
/// |-----------|-------|
/// | Connection, TLS, timeout, body read | [`FetchError::Transport`] |
/// | Non-2xx status | [`FetchError::Status`] |
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        tracing::debug!("{} answered {}", url, status);
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    tracing::debug!("Fetched {} ({} bytes)", url, body.len());
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&HttpConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_http_client_with_timeout() {
        let config = HttpConfig {
            timeout_secs: Some(5),
            ..HttpConfig::default()
        };
        assert!(HttpFetcher::new(&config).is_ok());
    }

    #[test]
    fn test_browser_headers() {
        let headers = browser_headers(&HttpConfig::default()).unwrap();

        assert_eq!(headers[header::REFERER], "https://www.meetup.com/");
        assert_eq!(headers[header::ACCEPT_LANGUAGE], "en-US,en;q=0.9");
        assert_eq!(headers["sec-fetch-mode"], "navigate");
        assert!(headers[header::ACCEPT]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert!(!headers.contains_key(header::ACCEPT_ENCODING));
    }

    #[test]
    fn test_invalid_header_value() {
        let config = HttpConfig {
            referer: "https://example.com/\n".to_string(),
            ..HttpConfig::default()
        };
        assert!(matches!(
            browser_headers(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    // Status and transport handling is exercised against wiremock in the
    // integration tests
}
