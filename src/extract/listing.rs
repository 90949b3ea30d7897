//! Event URL discovery on a group's events page

use scraper::{ElementRef, Html};
use serde_json::Value;

use super::dom::{self, FixedSelector};
use super::state::{self, StateGraph};
use super::with_fallback;
use crate::{ExtractionError, PageKind, StrategyError};

/// Key prefix of group entities in the node table
pub const GROUP_PREFIX: &str = "Group:";

static CARD_ANCHOR: FixedSelector = FixedSelector::new("a[href]");

/// Key prefix of the group's paginated events connections
const EVENTS_CONNECTION_PREFIX: &str = "events({";

/// Extracts event URLs from a group's events page, in page order
///
/// Reads the group's active events connection from the embedded state tree,
/// falling back to the numbered event cards of the rendered page.
///
/// # Errors
///
/// Returns an [`ExtractionError`] carrying both strategies' failures when
/// neither can locate the events.
///
/// # Example
///
/// ```
/// use meetup_events::extract_event_urls;
///
/// let html = r#"<a id="event-card-e-1" href="https://www.meetup.com/g/events/1/">One</a>"#;
/// let urls = extract_event_urls(html).unwrap();
/// assert_eq!(urls, vec!["https://www.meetup.com/g/events/1/".to_string()]);
/// ```
pub fn extract_event_urls(html: &str) -> Result<Vec<String>, ExtractionError> {
    let document = Html::parse_document(html);

    with_fallback(
        PageKind::Listing,
        || urls_from_state(&document),
        || urls_from_cards(&document),
    )
}

/// Structured-data strategy
pub(crate) fn urls_from_state(document: &Html) -> Result<Vec<String>, StrategyError> {
    let tree = state::parse_state_tree(document)?;
    let graph = StateGraph::from_tree(&tree)?;

    let group = graph
        .first_with_prefix(GROUP_PREFIX)
        .ok_or_else(|| StrategyError::MissingNode("group data".to_string()))?;

    let (connection_key, connection) = group
        .find_field(is_active_events_connection)
        .ok_or_else(|| StrategyError::MissingNode("events data".to_string()))?;

    let invalid = |field: String, expected| StrategyError::InvalidField {
        node: group.key().to_string(),
        field,
        expected,
    };

    // Only an inline connection object can be read; a reshaped one (a
    // reference, a scalar) leaves the page to the card fallback
    let connection = match connection {
        Value::Object(fields) if !fields.contains_key(state::REF_KEY) => fields,
        _ => return Err(invalid(connection_key.to_string(), "inline connection object")),
    };

    let edges = match connection.get("edges") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(edges)) => edges,
        Some(_) => return Err(invalid(format!("{}.edges", connection_key), "array")),
    };

    let urls = edges
        .iter()
        .filter_map(|edge| edge.get("node"))
        .filter_map(|reference| graph.resolve(reference))
        .filter_map(|event| event.str_field("eventUrl"))
        .map(str::to_string)
        .collect::<Vec<_>>();

    tracing::debug!(
        "Found {} event URLs in {} of {}",
        urls.len(),
        connection_key,
        group.key()
    );

    Ok(urls)
}

/// Connection keys look like `events({"filter":{"status":"ACTIVE"}})`
fn is_active_events_connection(key: &str) -> bool {
    key.starts_with(EVENTS_CONNECTION_PREFIX) && key.contains("status") && key.contains("ACTIVE")
}

/// DOM strategy
pub(crate) fn urls_from_cards(document: &Html) -> Result<Vec<String>, StrategyError> {
    let urls = EventCards::new(document.root_element()).collect::<Vec<_>>();

    if urls.is_empty() {
        return Err(dom::missing(&EventCards::card_selector(1)));
    }

    tracing::debug!("Found {} event cards", urls.len());
    Ok(urls)
}

/// Links of the numbered event cards (`#event-card-e-1`, `#event-card-e-2`, ...)
///
/// Cards are looked up one index at a time and the sequence ends at the first
/// index with no card (or a card without a link). Cards after a gap are never
/// reached.
pub struct EventCards<'a> {
    root: ElementRef<'a>,
    next_index: usize,
    finished: bool,
}

impl<'a> EventCards<'a> {
    pub fn new(root: ElementRef<'a>) -> Self {
        Self {
            root,
            next_index: 1,
            finished: false,
        }
    }

    fn card_selector(index: usize) -> String {
        format!("#event-card-e-{}", index)
    }

    /// The card itself is usually the anchor; older layouts nest one inside
    fn card_link(card: ElementRef<'_>) -> Option<String> {
        if card.value().name() == "a" {
            if let Some(href) = dom::attr(card, "href") {
                return Some(href);
            }
        }

        let anchor = CARD_ANCHOR.first(card)?;
        dom::attr(anchor, "href")
    }
}

impl Iterator for EventCards<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.finished {
            return None;
        }

        let css = Self::card_selector(self.next_index);
        let link = dom::select_first(self.root, &css)
            .ok()
            .flatten()
            .and_then(Self::card_link);

        match link {
            Some(link) => {
                self.next_index += 1;
                Some(link)
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}
