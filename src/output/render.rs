//! Rendering of event lists for the command line

use std::fmt::Write;

use crate::event::MeetupEvent;
use crate::output::OutputFormat;
use crate::ScrapeError;

/// Characters of description shown in the text listing
pub const DESCRIPTION_PREVIEW_CHARS: usize = 200;

/// Renders events in the requested format
pub fn render(events: &[MeetupEvent], format: OutputFormat) -> Result<String, ScrapeError> {
    match format {
        OutputFormat::Json => render_json(events),
        OutputFormat::Text => Ok(render_text(events)),
    }
}

/// Pretty-printed JSON array, the shape the events API serves
pub fn render_json(events: &[MeetupEvent]) -> Result<String, ScrapeError> {
    Ok(serde_json::to_string_pretty(events)?)
}

/// Human-readable listing, one numbered block per event
pub fn render_text(events: &[MeetupEvent]) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "Found {} events:", events.len());
    for (i, event) in events.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(out, "--- Event {} ---", i + 1);
        let _ = writeln!(out, "Name: {}", event.name);
        let _ = writeln!(out, "Date: {}", event.date);
        let _ = writeln!(out, "Link: {}", event.link);
        let _ = writeln!(out, "Venue: {}", or_none(&event.venue));
        let _ = writeln!(out, "Location: {}", event.location);
        let _ = writeln!(out, "Location Link: {}", or_none(&event.location_link));
        let _ = writeln!(out, "Image: {}", event.image);
        let _ = writeln!(out, "Description (preview): {}", preview(&event.description));
    }

    out
}

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

fn preview(description: &str) -> String {
    match description.char_indices().nth(DESCRIPTION_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &description[..cut]),
        None => description.to_string(),
    }
}
