//! The event record produced by extraction

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Location text used for events without a physical venue
pub const ONLINE: &str = "Online";

/// One meetup event, as extracted from its detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeetupEvent {
    /// Canonical event page URL
    pub link: String,

    /// Display title
    pub name: String,

    /// Plain-text body
    pub description: String,

    /// Featured photo URL, empty when the event has none
    pub image: String,

    /// Comma-joined address, or [`ONLINE`]
    pub location: String,

    /// Map search link, only for physical venues
    pub location_link: Option<String>,

    /// Venue name, only for physical venues
    pub venue: Option<String>,

    /// Start time
    pub date: EventDate,
}

impl MeetupEvent {
    /// Returns true if the event has no physical venue
    pub fn is_online(&self) -> bool {
        self.location == ONLINE
    }
}

/// Event start time as published on the page
///
/// Pages usually carry a UTC offset; when they don't, the wall-clock value is
/// kept as-is rather than guessing a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventDate {
    Zoned(DateTime<FixedOffset>),
    Local(NaiveDateTime),
}

impl EventDate {
    /// Parses an ISO-8601 date/time, with or without offset
    pub fn parse(value: &str) -> Result<Self, chrono::ParseError> {
        match DateTime::parse_from_rfc3339(value) {
            Ok(zoned) => Ok(Self::Zoned(zoned)),
            Err(zoned_err) => NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .map(Self::Local)
                .map_err(|_| zoned_err),
        }
    }

    /// Key used to order events chronologically
    ///
    /// Zoned times compare by their UTC instant, local times by wall clock.
    pub fn sort_key(&self) -> NaiveDateTime {
        match self {
            Self::Zoned(dt) => dt.naive_utc(),
            Self::Local(dt) => *dt,
        }
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zoned(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Local(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}
