//! Event record extraction from an event detail page

use std::sync::OnceLock;

use regex::Regex;
use scraper::Html;
use url::Url;

use super::dom::{self, FixedSelector};
use super::state::{self, Node, StateGraph};
use super::with_fallback;
use crate::event::{EventDate, MeetupEvent, ONLINE};
use crate::{ExtractionError, PageKind, StrategyError};

/// Key prefix of event entities in the node table
pub const EVENT_PREFIX: &str = "Event:";

/// Base of the map search link built for physical venues
const MAP_SEARCH_URL: &str = "https://maps.google.com/";

static LINK: FixedSelector = FixedSelector::new(r#"head > meta[property="og:url"]"#);
static CANONICAL: FixedSelector = FixedSelector::new(r#"head > link[rel="canonical"]"#);
static TITLE: FixedSelector = FixedSelector::new(
    r"#main > div.px-5.w-full.border-b.border-shadowColor.bg-white.py-2.lg\:py-6 > div > h1",
);
static IMAGE: FixedSelector = FixedSelector::new(r"#main > div.flex.w-full.flex-col.items-center.justify-between.border-t.border-gray2.bg-gray1.pb-6.lg\:px-5 > div.md\:max-w-screen.w-full.bg-gray1 > div > div.flex.flex-grow.flex-col.lg\:mt-5.lg\:max-w-2xl > div.emrv9za > div:nth-child(1) > picture > div > img");
static DESCRIPTION: FixedSelector = FixedSelector::new("#event-details > div.break-words");
static VENUE_LINK: FixedSelector = FixedSelector::new(r"#event-info > div.bg-white.px-5.pb-3.pt-6.sm\:pb-4\.5.lg\:py-5.lg\:rounded-t-2xl > div:nth-child(1) > div.flex.flex-col > div > div.overflow-hidden.pl-4.md\:pl-4\.5.lg\:pl-5 > a");
static LOCATION: FixedSelector = FixedSelector::new(r"#event-info > div.bg-white.px-5.pb-3.pt-6.sm\:pb-4\.5.lg\:py-5.lg\:rounded-t-2xl > div:nth-child(1) > div.flex.flex-col > div > div.overflow-hidden.pl-4.md\:pl-4\.5.lg\:pl-5 > div");

/// `dateTime` literal anywhere in the raw markup (usually inside inline JSON)
fn date_time_regex() -> &'static Regex {
    static DATE_TIME_RE: OnceLock<Regex> = OnceLock::new();
    DATE_TIME_RE.get_or_init(|| {
        Regex::new(r#""dateTime":"(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:[+-]\d{2}:\d{2})?)""#)
            .expect("valid dateTime regex")
    })
}

/// Extracts the event record from an event detail page
///
/// Reads the event entity of the embedded state tree, falling back to the
/// rendered page's layout when the tree is missing or incomplete.
///
/// # Errors
///
/// Returns an [`ExtractionError`] carrying both strategies' failures when
/// neither produces a complete record.
pub fn extract_event(html: &str) -> Result<MeetupEvent, ExtractionError> {
    let document = Html::parse_document(html);

    with_fallback(
        PageKind::Event,
        || event_from_state(&document),
        || event_from_dom(&document, html),
    )
}

/// Structured-data strategy
pub(crate) fn event_from_state(document: &Html) -> Result<MeetupEvent, StrategyError> {
    let tree = state::parse_state_tree(document)?;
    let graph = StateGraph::from_tree(&tree)?;

    let event = graph
        .first_with_prefix(EVENT_PREFIX)
        .ok_or_else(|| StrategyError::MissingNode("event data".to_string()))?;

    let link = event.required_text("eventUrl")?.to_string();
    let name = event.required_text("title")?.to_string();
    let description = event.required_str("description")?.to_string();

    let image = graph
        .resolve_field(&event, "featuredEventPhoto")
        .and_then(|photo| photo.str_field("highResUrl"))
        .unwrap_or_default()
        .to_string();

    let (location, location_link, venue) = match graph.resolve_field(&event, "venue") {
        Some(venue) => physical_location(&venue),
        None => (ONLINE.to_string(), None, None),
    };

    let date = state_date(&event)?;

    Ok(MeetupEvent {
        link,
        name,
        description,
        image,
        location,
        location_link,
        venue,
        date,
    })
}

/// Location, map link and venue name of a venue node
fn physical_location(venue: &Node<'_>) -> (String, Option<String>, Option<String>) {
    let location = ["address", "city", "state", "country"]
        .iter()
        .filter_map(|field| venue.str_field(field))
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let location_link = map_search_link(&location);
    let name = venue.str_field("name").map(str::to_string);

    (location, location_link, name)
}

/// Map search URL for an address, with the query percent-encoded
pub fn map_search_link(location: &str) -> Option<String> {
    let mut url = Url::parse(MAP_SEARCH_URL).ok()?;
    url.query_pairs_mut().append_pair("q", location);
    Some(url.into())
}

/// Start time of an event node; a missing time is an error, never "now"
fn state_date(event: &Node<'_>) -> Result<EventDate, StrategyError> {
    let value = event.required_str("dateTime")?;
    EventDate::parse(value).map_err(|e| StrategyError::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// DOM strategy
pub(crate) fn event_from_dom(document: &Html, html: &str) -> Result<MeetupEvent, StrategyError> {
    let root = document.root_element();

    let og_url = LINK.first(root).and_then(|meta| dom::attr(meta, "content"));
    let link = match og_url {
        Some(link) => link,
        None => CANONICAL
            .first(root)
            .and_then(|canonical| dom::attr(canonical, "href"))
            .ok_or_else(|| LINK.missing())?,
    };

    let name = dom::element_text(TITLE.require(root)?);
    if name.is_empty() {
        return Err(TITLE.missing());
    }

    let image = IMAGE
        .first(root)
        .and_then(|img| dom::attr(img, "src"))
        .unwrap_or_default();

    let description = DESCRIPTION
        .first(root)
        .map(dom::flatten_rich_text)
        .unwrap_or_default();

    let location_text = dom::own_text(LOCATION.require(root)?);
    if location_text.is_empty() {
        return Err(LOCATION.missing());
    }

    let date = dom_date(html)?;

    // "Online event" and similar labels normalize to the same value the
    // structured path produces
    let (location, location_link, venue) =
        if location_text.split_whitespace().next() == Some(ONLINE) {
            (ONLINE.to_string(), None, None)
        } else {
            let anchor = VENUE_LINK.require(root)?;
            let venue = dom::own_text(anchor);
            if venue.is_empty() {
                return Err(VENUE_LINK.missing());
            }
            (location_text, dom::attr(anchor, "href"), Some(venue))
        };

    Ok(MeetupEvent {
        link,
        name,
        description,
        image,
        location,
        location_link,
        venue,
        date,
    })
}

fn dom_date(html: &str) -> Result<EventDate, StrategyError> {
    let captures = date_time_regex()
        .captures(html)
        .ok_or_else(|| StrategyError::MissingField {
            node: "page markup".to_string(),
            field: "dateTime".to_string(),
        })?;

    let value = &captures[1];
    EventDate::parse(value).map_err(|e| StrategyError::InvalidDate {
        value: value.to_string(),
        reason: e.to_string(),
    })
}
