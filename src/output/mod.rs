//! Output module for presenting crawled events
//!
//! This module handles:
//! - Ordering events the way the events API does (office hours last)
//! - Limiting the number of events returned
//! - Rendering events as JSON or as a readable listing

mod render;

pub use render::{render, render_json, render_text, DESCRIPTION_PREVIEW_CHARS};

use serde::Deserialize;

use crate::event::MeetupEvent;

/// Title marker of recurring office-hours sessions, matched case-insensitively
pub const OFFICE_HOURS_MARKER: &str = "office hours";

/// Sort direction by event date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// How events are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

/// Returns true for recurring office-hours sessions
pub fn is_office_hours(event: &MeetupEvent) -> bool {
    event.name.to_lowercase().contains(OFFICE_HOURS_MARKER)
}

/// Sorts events by date
///
/// Office-hours sessions sort after every other event in ascending order, so
/// one-off events lead the list. Descending order is the exact reverse.
/// The sort is stable: events with equal keys keep their listing order.
pub fn sort_events(events: &mut [MeetupEvent], order: SortOrder) {
    events.sort_by(|a, b| {
        let key_a = (is_office_hours(a), a.date.sort_key());
        let key_b = (is_office_hours(b), b.date.sort_key());
        match order {
            SortOrder::Asc => key_a.cmp(&key_b),
            SortOrder::Desc => key_b.cmp(&key_a),
        }
    });
}

/// Keeps at most `limit` events
pub fn apply_limit(events: &mut Vec<MeetupEvent>, limit: Option<usize>) {
    if let Some(limit) = limit {
        events.truncate(limit);
    }
}

/// Sorts then limits, as the events API does before serializing
pub fn prepare(mut events: Vec<MeetupEvent>, order: SortOrder, limit: Option<usize>) -> Vec<MeetupEvent> {
    sort_events(&mut events, order);
    apply_limit(&mut events, limit);
    events
}
