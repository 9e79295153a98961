//! Calendar event domain model.
//!
//! # Responsibility
//! - Define the canonical event record shared by calendar/scheduler views.
//! - Validate user-submitted drafts before they reach persistence.
//!
//! # Invariants
//! - `id` is stable and never reused for another event.
//! - Events are keyed by exact calendar day; `time` is display metadata and
//!   never part of the key.
//! - Multiple events may share one date.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a calendar event.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type EventId = Uuid;

// 24-hour wall-clock time, e.g. "09:30". Compiled once per process.
static TIME_OF_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("time pattern is valid"));

/// Canonical calendar entry attached to a specific day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Stable global ID used for updates and deletion.
    pub id: EventId,
    /// Calendar day the event belongs to (serialized as an ISO date).
    pub date: NaiveDate,
    /// Short user-facing title.
    pub title: String,
    /// Free-form body text.
    pub description: String,
    /// Optional wall-clock time in `HH:MM`, or empty for all-day entries.
    pub time: String,
}

/// User-submitted form input for a new event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub date: NaiveDate,
    pub title: String,
    pub description: String,
    pub time: String,
}

/// Partial update applied to an existing event in place.
///
/// `None` fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub date: Option<NaiveDate>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub time: Option<String>,
}

/// Validation failures for event drafts and patched events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
    /// Time is neither empty nor a 24-hour `HH:MM` string.
    InvalidTimeOfDay(String),
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "event title cannot be empty"),
            Self::InvalidTimeOfDay(value) => {
                write!(f, "event time `{value}` is not a valid HH:MM value")
            }
        }
    }
}

impl Error for EventValidationError {}

impl EventDraft {
    /// Checks form-level constraints before the draft becomes an event.
    ///
    /// # Errors
    /// - `EmptyTitle` when the trimmed title is empty.
    /// - `InvalidTimeOfDay` when `time` is non-empty and not `HH:MM`.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        validate_fields(&self.title, &self.time)
    }
}

impl CalendarEvent {
    /// Materializes a validated draft into an event with a fresh stable ID.
    ///
    /// # Errors
    /// Returns the draft's validation error unchanged; no ID is consumed on
    /// failure.
    pub fn from_draft(draft: EventDraft) -> Result<Self, EventValidationError> {
        draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            date: draft.date,
            title: draft.title,
            description: draft.description,
            time: draft.time,
        })
    }

    /// Applies a partial update, leaving `None` fields untouched.
    ///
    /// Identity and validation are the caller's concern; the store validates
    /// the patched event before committing it.
    pub fn apply(&mut self, patch: &EventPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(time) = &patch.time {
            self.time = time.clone();
        }
    }

    /// Exact calendar-day equality; time-of-day never participates.
    pub fn occurs_on(&self, day: NaiveDate) -> bool {
        self.date == day
    }

    /// Re-checks field constraints, e.g. after applying a patch.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        validate_fields(&self.title, &self.time)
    }
}

fn validate_fields(title: &str, time: &str) -> Result<(), EventValidationError> {
    if title.trim().is_empty() {
        return Err(EventValidationError::EmptyTitle);
    }
    if !time.is_empty() && !TIME_OF_DAY.is_match(time) {
        return Err(EventValidationError::InvalidTimeOfDay(time.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CalendarEvent, EventDraft, EventPatch, EventValidationError};
    use chrono::NaiveDate;

    fn draft(title: &str, time: &str) -> EventDraft {
        EventDraft {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            title: title.to_string(),
            description: String::new(),
            time: time.to_string(),
        }
    }

    #[test]
    fn draft_with_title_and_empty_time_is_valid() {
        assert!(draft("Meeting", "").validate().is_ok());
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = draft("   ", "09:30").validate().unwrap_err();
        assert_eq!(err, EventValidationError::EmptyTitle);
    }

    #[test]
    fn malformed_time_is_rejected() {
        for bad in ["24:00", "9:30", "12:60", "noonish"] {
            let err = draft("Meeting", bad).validate().unwrap_err();
            assert_eq!(err, EventValidationError::InvalidTimeOfDay(bad.to_string()));
        }
        assert!(draft("Meeting", "23:59").validate().is_ok());
        assert!(draft("Meeting", "00:00").validate().is_ok());
    }

    #[test]
    fn patch_keeps_unset_fields() {
        let mut event = CalendarEvent::from_draft(draft("Meeting", "09:30")).unwrap();
        let original_id = event.id;

        event.apply(&EventPatch {
            title: Some("Lunch".to_string()),
            ..EventPatch::default()
        });

        assert_eq!(event.id, original_id);
        assert_eq!(event.title, "Lunch");
        assert_eq!(event.time, "09:30");
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    }

    #[test]
    fn event_serializes_date_as_iso_string() {
        let event = CalendarEvent::from_draft(draft("Meeting", "")).unwrap();
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["date"], "2024-05-01");
        assert_eq!(json["title"], "Meeting");

        let decoded: CalendarEvent = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
    }
}
