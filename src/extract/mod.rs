//! Page extraction
//!
//! Every page is read with two strategies:
//! - the embedded application-state tree (preferred, see [`state`])
//! - the rendered DOM through fixed selectors (fallback, see [`dom`])
//!
//! The fallback only runs when the preferred strategy fails, and a page fails
//! only when both do. The resulting [`ExtractionError`] keeps both causes.

pub mod dom;
mod event;
mod listing;
pub mod state;

pub use event::{extract_event, map_search_link, EVENT_PREFIX};
pub use listing::{extract_event_urls, EventCards, GROUP_PREFIX};

use crate::{ExtractionError, PageKind, StrategyError};

/// Runs `primary`, then `fallback` if it fails
pub(crate) fn with_fallback<T, P, F>(
    page: PageKind,
    primary: P,
    fallback: F,
) -> Result<T, ExtractionError>
where
    P: FnOnce() -> Result<T, StrategyError>,
    F: FnOnce() -> Result<T, StrategyError>,
{
    let primary = match primary() {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    tracing::warn!(
        "Structured data unusable on {}: {}; falling back to DOM selectors",
        page,
        primary
    );

    match fallback() {
        Ok(value) => {
            tracing::debug!("DOM fallback succeeded on {}", page);
            Ok(value)
        }
        Err(fallback) => Err(ExtractionError {
            page,
            primary,
            fallback,
        }),
    }
}
