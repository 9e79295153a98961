//! Core domain logic for the parlor mini-apps.
//! This crate is the single source of truth for game and calendar
//! invariants; rendering hosts consume snapshots and emit intents.

pub mod db;
pub mod game;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use game::deck::{deal, deal_with};
pub use game::engine::{
    MatchEngine, RevertToken, SelectOutcome, TimerPort, MISMATCH_REVERT_DELAY, TICK_PERIOD,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::card::{Board, BoardLayoutError, Card, Difficulty, SymbolId};
pub use model::event::{CalendarEvent, EventDraft, EventId, EventPatch, EventValidationError};
pub use repo::kv_repo::{
    InMemoryKeyValueRepository, KeyValueRepository, RepoError, RepoResult,
    SqliteKeyValueRepository,
};
pub use service::calendar_service::{
    CalendarError, CalendarResult, CalendarService, EVENTS_STORAGE_KEY,
};
pub use service::game_service::{CardView, GameSession, GameSnapshot};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
