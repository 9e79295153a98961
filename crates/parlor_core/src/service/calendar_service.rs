//! Calendar event store.
//!
//! # Responsibility
//! - Keep the event collection and its single-key persisted form in step.
//! - Surface validation and identity errors; swallow storage write errors.
//!
//! # Invariants
//! - Every mutation serializes the entire collection under one fixed key.
//! - Absent or malformed persisted state degrades to an empty collection,
//!   never a failure.
//! - Insertion order is preserved; duplicate (date, title) pairs are
//!   permitted.

use crate::model::event::{CalendarEvent, EventDraft, EventId, EventPatch, EventValidationError};
use crate::repo::kv_repo::KeyValueRepository;
use chrono::NaiveDate;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed storage key for the serialized event collection.
pub const EVENTS_STORAGE_KEY: &str = "calendar_events";

pub type CalendarResult<T> = Result<T, CalendarError>;

/// Semantic errors for calendar mutations.
///
/// Storage write failures are not represented here: the store logs and
/// swallows them, keeping the in-memory collection authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    Validation(EventValidationError),
    NotFound(EventId),
}

impl Display for CalendarError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "event not found: {id}"),
        }
    }
}

impl Error for CalendarError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<EventValidationError> for CalendarError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Event collection persisted through a key-value repository.
pub struct CalendarService<S: KeyValueRepository> {
    repo: S,
    events: Vec<CalendarEvent>,
}

impl<S: KeyValueRepository> CalendarService<S> {
    /// Opens the store, loading whatever the repository holds.
    ///
    /// An absent key starts empty; a malformed payload is logged and also
    /// starts empty. Neither is an error.
    pub fn open(repo: S) -> Self {
        let events = match repo.load(EVENTS_STORAGE_KEY) {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<CalendarEvent>>(&payload) {
                Ok(events) => events,
                Err(err) => {
                    warn!(
                        "event=events_load module=calendar status=malformed error={err}"
                    );
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("event=events_load module=calendar status=error error={err}");
                Vec::new()
            }
        };

        Self { repo, events }
    }

    /// Adds a new event from form input.
    ///
    /// # Errors
    /// Validation failures block the add; nothing is persisted.
    pub fn add(&mut self, draft: EventDraft) -> CalendarResult<EventId> {
        let event = CalendarEvent::from_draft(draft)?;
        let id = event.id;
        self.events.push(event);
        self.persist();
        Ok(id)
    }

    /// Updates an event in place by stable identity.
    ///
    /// The patched event is validated before it replaces the stored one, so
    /// a bad patch leaves the collection unchanged.
    pub fn update(&mut self, id: EventId, patch: &EventPatch) -> CalendarResult<()> {
        let Some(event) = self.events.iter_mut().find(|event| event.id == id) else {
            return Err(CalendarError::NotFound(id));
        };

        let mut updated = event.clone();
        updated.apply(patch);
        updated.validate()?;
        *event = updated;

        self.persist();
        Ok(())
    }

    /// Removes an event by stable identity.
    pub fn remove(&mut self, id: EventId) -> CalendarResult<()> {
        let Some(position) = self.events.iter().position(|event| event.id == id) else {
            return Err(CalendarError::NotFound(id));
        };
        self.events.remove(position);
        self.persist();
        Ok(())
    }

    /// Returns the events of one exact calendar day, in insertion order.
    pub fn events_on(&self, day: NaiveDate) -> Vec<CalendarEvent> {
        self.events
            .iter()
            .filter(|event| event.occurs_on(day))
            .cloned()
            .collect()
    }

    /// Full collection, insertion order.
    pub fn all(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    // Whole-collection write-through on every mutation. Write failures are
    // logged and swallowed; the in-memory collection stays authoritative.
    fn persist(&self) {
        let payload = match serde_json::to_string(&self.events) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("event=events_save module=calendar status=encode_error error={err}");
                return;
            }
        };
        if let Err(err) = self.repo.save(EVENTS_STORAGE_KEY, &payload) {
            warn!("event=events_save module=calendar status=error error={err}");
        }
    }
}
