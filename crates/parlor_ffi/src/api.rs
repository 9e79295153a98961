//! FFI use-case API for UI-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to the host via FRB.
//! - Keep error semantics simple for UI integration.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - The host owns all real timers; the core only hands out directives and
//!   accepts the callbacks (`game_revert_due`, `game_tick`).

use chrono::NaiveDate;
use log::{info, warn};
use parlor_core::db::open_db;
use parlor_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CalendarService, Difficulty, EventDraft, EventPatch, GameSession, RevertToken, SelectOutcome,
    SqliteKeyValueRepository, TimerPort,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;
use uuid::Uuid;

const STORAGE_DB_FILE_NAME: &str = "parlor.sqlite3";
static STORAGE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static GAME: Mutex<Option<GameSession<DirectiveTimer>>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Fixes the storage directory for calendar persistence.
///
/// # FFI contract
/// - First call wins; later calls with the same directory are idempotent,
///   conflicting ones return an error message.
/// - Never panics; returns empty string on success.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(storage_dir: String) -> String {
    let trimmed = storage_dir.trim();
    if trimmed.is_empty() {
        return "storage_dir cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed).join(STORAGE_DB_FILE_NAME);

    let active = STORAGE_DB_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return format!(
            "storage already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        );
    }
    String::new()
}

/// One timer request the host must act on.
///
/// `kind` is one of `schedule_revert | cancel_revert | start_ticker |
/// stop_ticker`. For revert kinds, `generation/first/second` rebuild the
/// token to pass back through [`game_revert_due`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerDirective {
    pub kind: String,
    pub delay_ms: u64,
    pub generation: u64,
    pub first: u64,
    pub second: u64,
}

/// One card as rendered by the host; hidden cards carry no symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameCard {
    pub symbol: Option<u64>,
    pub face_up: bool,
    pub matched: bool,
}

/// Full game state plus the timer directives accumulated since the last
/// call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStateResponse {
    pub ok: bool,
    pub cards: Vec<GameCard>,
    pub moves: u32,
    pub elapsed_seconds: u64,
    pub game_over: bool,
    pub difficulty: String,
    pub generation: u64,
    /// What the last `select` did: `rejected | first | matched | mismatched`,
    /// or empty for non-select calls.
    pub outcome: String,
    pub timer_directives: Vec<TimerDirective>,
    pub message: String,
}

/// Starts a new game session at the given difficulty.
///
/// # FFI contract
/// - `difficulty` is one of `easy|medium|hard` (case-insensitive).
/// - Replaces any running session.
/// - Never panics; `ok=false` carries a readable message.
#[flutter_rust_bridge::frb(sync)]
pub fn game_new(difficulty: String) -> GameStateResponse {
    let Some(difficulty) = parse_difficulty(&difficulty) else {
        return GameStateResponse::failure(format!(
            "unknown difficulty `{difficulty}`; expected easy|medium|hard"
        ));
    };

    with_game(|slot| {
        let session = slot.insert(GameSession::new(difficulty, DirectiveTimer::default()));
        info!(
            "event=game_new module=ffi status=ok difficulty={}",
            difficulty_label(difficulty)
        );
        respond(session, String::new())
    })
}

/// Forwards one card click.
///
/// # FFI contract
/// - Invalid selections are reported as `outcome="rejected"`, never errors.
#[flutter_rust_bridge::frb(sync)]
pub fn game_select(index: u64) -> GameStateResponse {
    with_running_game(|session| {
        let outcome = session.select(index as usize);
        let label = match outcome {
            SelectOutcome::Rejected => "rejected",
            SelectOutcome::FirstRevealed { .. } => "first",
            SelectOutcome::Matched { .. } => "matched",
            SelectOutcome::Mismatched { .. } => "mismatched",
        };
        label.to_string()
    })
}

/// Host callback once a scheduled revert delay expired.
///
/// # FFI contract
/// - Stale tokens are dropped silently; the response reflects the current
///   board either way.
#[flutter_rust_bridge::frb(sync)]
pub fn game_revert_due(generation: u64, first: u64, second: u64) -> GameStateResponse {
    with_running_game(|session| {
        let token = RevertToken::new(generation, first as usize, second as usize);
        session.revert_due(token);
        String::new()
    })
}

/// Host callback for the periodic one-second ticker.
#[flutter_rust_bridge::frb(sync)]
pub fn game_tick() -> GameStateResponse {
    with_running_game(|session| {
        session.tick();
        String::new()
    })
}

/// Restarts the current session with a fresh board at the same difficulty.
#[flutter_rust_bridge::frb(sync)]
pub fn game_restart() -> GameStateResponse {
    with_running_game(|session| {
        session.restart();
        String::new()
    })
}

/// Switches difficulty, replacing the board wholesale.
#[flutter_rust_bridge::frb(sync)]
pub fn game_change_difficulty(difficulty: String) -> GameStateResponse {
    let Some(parsed) = parse_difficulty(&difficulty) else {
        return GameStateResponse::failure(format!(
            "unknown difficulty `{difficulty}`; expected easy|medium|hard"
        ));
    };
    with_running_game(|session| {
        session.change_difficulty(parsed);
        String::new()
    })
}

/// Calendar event as rendered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventView {
    pub event_id: String,
    pub date_iso: String,
    pub title: String,
    pub description: String,
    pub time: String,
}

/// Generic action response envelope for calendar mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Created/affected event ID.
    pub event_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl EventActionResponse {
    fn success(event_id: String) -> Self {
        Self {
            ok: true,
            event_id: Some(event_id),
            message: String::new(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            event_id: None,
            message: message.into(),
        }
    }
}

/// List response envelope for day queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListResponse {
    pub ok: bool,
    pub items: Vec<EventView>,
    pub message: String,
}

/// Adds a calendar event from form input.
///
/// # FFI contract
/// - `date_iso` is a `YYYY-MM-DD` string; `time` is `HH:MM` or empty.
/// - Validation failures return `ok=false` with the reason.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_add_event(
    date_iso: String,
    title: String,
    description: String,
    time: String,
) -> EventActionResponse {
    let Ok(date) = date_iso.parse::<NaiveDate>() else {
        return EventActionResponse::failure(format!("invalid date `{date_iso}`"));
    };

    with_calendar(|store| {
        let draft = EventDraft {
            date,
            title,
            description,
            time,
        };
        match store.add(draft) {
            Ok(id) => EventActionResponse::success(id.to_string()),
            Err(err) => EventActionResponse::failure(err.to_string()),
        }
    })
    .unwrap_or_else(EventActionResponse::failure)
}

/// Updates an event in place; `None` fields keep their current value.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_update_event(
    event_id: String,
    date_iso: Option<String>,
    title: Option<String>,
    description: Option<String>,
    time: Option<String>,
) -> EventActionResponse {
    let Ok(id) = Uuid::parse_str(&event_id) else {
        return EventActionResponse::failure(format!("invalid event id `{event_id}`"));
    };
    let date = match date_iso {
        Some(raw) => match raw.parse::<NaiveDate>() {
            Ok(date) => Some(date),
            Err(_) => return EventActionResponse::failure(format!("invalid date `{raw}`")),
        },
        None => None,
    };

    with_calendar(|store| {
        let patch = EventPatch {
            date,
            title,
            description,
            time,
        };
        match store.update(id, &patch) {
            Ok(()) => EventActionResponse::success(id.to_string()),
            Err(err) => EventActionResponse::failure(err.to_string()),
        }
    })
    .unwrap_or_else(EventActionResponse::failure)
}

/// Removes an event by stable identity.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_remove_event(event_id: String) -> EventActionResponse {
    let Ok(id) = Uuid::parse_str(&event_id) else {
        return EventActionResponse::failure(format!("invalid event id `{event_id}`"));
    };

    with_calendar(|store| match store.remove(id) {
        Ok(()) => EventActionResponse::success(id.to_string()),
        Err(err) => EventActionResponse::failure(err.to_string()),
    })
    .unwrap_or_else(EventActionResponse::failure)
}

/// Lists the events of one exact calendar day, in insertion order.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_events_on(date_iso: String) -> EventListResponse {
    let Ok(date) = date_iso.parse::<NaiveDate>() else {
        return EventListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("invalid date `{date_iso}`"),
        };
    };

    with_calendar(|store| {
        let items = store
            .events_on(date)
            .into_iter()
            .map(|event| EventView {
                event_id: event.id.to_string(),
                date_iso: event.date.to_string(),
                title: event.title,
                description: event.description,
                time: event.time,
            })
            .collect();
        EventListResponse {
            ok: true,
            items,
            message: String::new(),
        }
    })
    .unwrap_or_else(|message| EventListResponse {
        ok: false,
        items: Vec::new(),
        message,
    })
}

/// Timer port that records directives for the host to execute.
#[derive(Debug, Default)]
struct DirectiveTimer {
    directives: Vec<TimerDirective>,
}

impl DirectiveTimer {
    fn drain(&mut self) -> Vec<TimerDirective> {
        std::mem::take(&mut self.directives)
    }

    fn push(&mut self, kind: &str, delay_ms: u64, token: Option<RevertToken>) {
        let (generation, first, second) = token.map_or((0, 0, 0), |token| {
            (
                token.generation(),
                token.first() as u64,
                token.second() as u64,
            )
        });
        self.directives.push(TimerDirective {
            kind: kind.to_string(),
            delay_ms,
            generation,
            first,
            second,
        });
    }
}

impl TimerPort for DirectiveTimer {
    fn schedule_revert(&mut self, delay: Duration, token: RevertToken) {
        self.push("schedule_revert", delay.as_millis() as u64, Some(token));
    }

    fn cancel_revert(&mut self, token: RevertToken) {
        self.push("cancel_revert", 0, Some(token));
    }

    fn start_ticker(&mut self, period: Duration) {
        self.push("start_ticker", period.as_millis() as u64, None);
    }

    fn stop_ticker(&mut self) {
        self.push("stop_ticker", 0, None);
    }
}

impl GameStateResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            cards: Vec::new(),
            moves: 0,
            elapsed_seconds: 0,
            game_over: false,
            difficulty: String::new(),
            generation: 0,
            outcome: String::new(),
            timer_directives: Vec::new(),
            message: message.into(),
        }
    }
}

fn with_game<F>(f: F) -> GameStateResponse
where
    F: FnOnce(&mut Option<GameSession<DirectiveTimer>>) -> GameStateResponse,
{
    match GAME.lock() {
        Ok(mut slot) => f(&mut slot),
        // A poisoned lock means a previous host call panicked mid-update;
        // report instead of propagating the panic across the boundary.
        Err(_) => GameStateResponse::failure("game session state is poisoned"),
    }
}

fn with_running_game<F>(f: F) -> GameStateResponse
where
    F: FnOnce(&mut GameSession<DirectiveTimer>) -> String,
{
    with_game(|slot| {
        let Some(session) = slot.as_mut() else {
            return GameStateResponse::failure("no game in progress; call game_new first");
        };
        let outcome = f(session);
        respond(session, outcome)
    })
}

fn respond(session: &mut GameSession<DirectiveTimer>, outcome: String) -> GameStateResponse {
    let snapshot = session.snapshot();
    let timer_directives = session.engine_mut().timer_mut().drain();

    GameStateResponse {
        ok: true,
        cards: snapshot
            .cards
            .iter()
            .map(|card| GameCard {
                symbol: card.symbol.map(|symbol| symbol as u64),
                face_up: card.face_up,
                matched: card.matched,
            })
            .collect(),
        moves: snapshot.moves,
        elapsed_seconds: snapshot.elapsed_seconds,
        game_over: snapshot.game_over,
        difficulty: difficulty_label(snapshot.difficulty).to_string(),
        generation: snapshot.generation,
        outcome,
        timer_directives,
        message: String::new(),
    }
}

fn with_calendar<T>(f: impl FnOnce(&mut CalendarService<SqliteKeyValueRepository<'_>>) -> T) -> Result<T, String> {
    let Some(path) = STORAGE_DB_PATH.get() else {
        return Err("storage not configured; call configure_storage first".to_string());
    };

    let conn = open_db(path).map_err(|err| {
        warn!("event=calendar_call module=ffi status=error error={err}");
        format!("failed to open storage: {err}")
    })?;
    let repo = SqliteKeyValueRepository::try_new(&conn)
        .map_err(|err| format!("storage rejected: {err}"))?;
    let mut store = CalendarService::open(repo);
    Ok(f(&mut store))
}

fn parse_difficulty(raw: &str) -> Option<Difficulty> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "easy" => Some(Difficulty::Easy),
        "medium" => Some(Difficulty::Medium),
        "hard" => Some(Difficulty::Hard),
        _ => None,
    }
}

fn difficulty_label(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Medium => "medium",
        Difficulty::Hard => "hard",
    }
}
