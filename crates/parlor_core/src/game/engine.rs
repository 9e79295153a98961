//! Matching-game state machine.
//!
//! # Responsibility
//! - Track face-up/matched state across the board.
//! - Resolve pairs and schedule mismatch reverts through the timer port.
//! - Detect completion and stop the elapsed-time ticker.
//!
//! # Invariants
//! - At most two cards are pending at any time.
//! - While a resolution is in flight (`Evaluating`), selections are rejected
//!   outright, never queued.
//! - A revert callback from an older generation never touches the current
//!   board; reset and completion cancel in-flight timers.

use crate::game::deck;
use crate::model::card::{validate_board, Board, BoardLayoutError, Card};
use log::{debug, info};
use std::time::Duration;

/// How long mismatched cards stay face-up before reverting.
pub const MISMATCH_REVERT_DELAY: Duration = Duration::from_millis(1000);

/// Period of the elapsed-time ticker while a game is active.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Identifies one scheduled mismatch revert.
///
/// Carries the engine generation, so callbacks scheduled before a reset are
/// recognized as stale and dropped. Hosts that round-trip the token over a
/// process boundary can rebuild it with [`RevertToken::new`]; a token that
/// does not match the in-flight revert is simply ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevertToken {
    generation: u64,
    first: usize,
    second: usize,
}

impl RevertToken {
    pub fn new(generation: u64, first: usize, second: usize) -> Self {
        Self {
            generation,
            first,
            second,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Index of the first card of the mismatched pair.
    pub fn first(&self) -> usize {
        self.first
    }

    /// Index of the second card of the mismatched pair.
    pub fn second(&self) -> usize {
        self.second
    }
}

/// Timer collaborator contract.
///
/// The core never implements timing itself: it asks the host for a one-shot
/// cancellable callback (mismatch revert) and a periodic tick (elapsed
/// seconds), and the host calls back into [`MatchEngine::revert_due`] and
/// [`MatchEngine::tick`].
pub trait TimerPort {
    /// Requests a single callback after `delay`, carrying `token`.
    fn schedule_revert(&mut self, delay: Duration, token: RevertToken);
    /// Withdraws a previously scheduled callback. Best effort; a late
    /// delivery is still rejected by the token check.
    fn cancel_revert(&mut self, token: RevertToken);
    /// Requests periodic callbacks every `period` while the game runs.
    fn start_ticker(&mut self, period: Duration);
    /// Stops the periodic callbacks.
    fn stop_ticker(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    OneSelected { first: usize },
    Evaluating { first: usize, second: usize },
}

/// Outcome of one `select` call, for the host to render and act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// The selection was invalid (matched card, repeated card, resolution in
    /// flight, out of range, or game over) and was ignored.
    Rejected,
    /// First card of a pair turned face-up.
    FirstRevealed { index: usize },
    /// Pair resolved as a match; both cards are settled.
    Matched {
        first: usize,
        second: usize,
        game_over: bool,
    },
    /// Pair resolved as a mismatch; a revert was scheduled with the host.
    Mismatched { first: usize, second: usize },
}

/// Cooperative, single-threaded matching-game engine.
///
/// Every transition happens inside a host call: `select` for clicks,
/// `revert_due` for the one-shot timer, `tick` for the periodic timer.
pub struct MatchEngine<T: TimerPort> {
    board: Board,
    phase: Phase,
    moves: u32,
    elapsed_seconds: u64,
    game_over: bool,
    generation: u64,
    pending_revert: Option<RevertToken>,
    timer: T,
}

impl<T: TimerPort> MatchEngine<T> {
    /// Starts a game over a freshly dealt board of `pair_count` pairs.
    pub fn new(pair_count: usize, timer: T) -> Self {
        Self::start(deck::deal(pair_count), timer)
    }

    /// Starts a game over a caller-provided layout.
    ///
    /// # Errors
    /// Rejects layouts that break the pairing invariant.
    pub fn with_board(board: Board, timer: T) -> Result<Self, BoardLayoutError> {
        validate_board(&board)?;
        Ok(Self::start(board, timer))
    }

    fn start(board: Board, mut timer: T) -> Self {
        // An empty board has nothing to match; treat it as already complete
        // and leave the ticker off.
        let game_over = board.is_empty();
        if !game_over {
            timer.start_ticker(TICK_PERIOD);
        }
        Self {
            board,
            phase: Phase::Idle,
            moves: 0,
            elapsed_seconds: 0,
            game_over,
            generation: 0,
            pending_revert: None,
            timer,
        }
    }

    /// Handles one card selection from the host.
    ///
    /// Invalid selections are silently ignored and reported as `Rejected`;
    /// they are not errors and leave the board untouched.
    pub fn select(&mut self, index: usize) -> SelectOutcome {
        if self.game_over || matches!(self.phase, Phase::Evaluating { .. }) {
            return SelectOutcome::Rejected;
        }
        let Some(card) = self.board.get(index) else {
            return SelectOutcome::Rejected;
        };
        if !card.is_selectable() {
            return SelectOutcome::Rejected;
        }

        match self.phase {
            Phase::Idle => {
                self.board[index].reveal();
                self.phase = Phase::OneSelected { first: index };
                SelectOutcome::FirstRevealed { index }
            }
            Phase::OneSelected { first } if first == index => SelectOutcome::Rejected,
            Phase::OneSelected { first } => {
                self.board[index].reveal();
                self.moves += 1;
                if self.board[first].symbol == self.board[index].symbol {
                    self.resolve_match(first, index)
                } else {
                    self.resolve_mismatch(first, index)
                }
            }
            // Evaluating was rejected above.
            Phase::Evaluating { .. } => SelectOutcome::Rejected,
        }
    }

    fn resolve_match(&mut self, first: usize, second: usize) -> SelectOutcome {
        self.board[first].settle();
        self.board[second].settle();
        self.phase = Phase::Idle;

        if self.matched_count() == self.board.len() {
            self.game_over = true;
            self.timer.stop_ticker();
            info!(
                "event=game_over module=game status=ok moves={} elapsed_s={}",
                self.moves, self.elapsed_seconds
            );
        }

        SelectOutcome::Matched {
            first,
            second,
            game_over: self.game_over,
        }
    }

    fn resolve_mismatch(&mut self, first: usize, second: usize) -> SelectOutcome {
        self.phase = Phase::Evaluating { first, second };
        let token = RevertToken::new(self.generation, first, second);
        self.pending_revert = Some(token);
        self.timer.schedule_revert(MISMATCH_REVERT_DELAY, token);
        SelectOutcome::Mismatched { first, second }
    }

    /// Host callback when the mismatch display delay expires.
    ///
    /// Returns whether the token was current and the cards were reverted.
    /// Stale tokens (reset, completed, or already-resolved games) are
    /// dropped without touching the board.
    pub fn revert_due(&mut self, token: RevertToken) -> bool {
        if self.pending_revert != Some(token) {
            debug!("event=revert_dropped module=game status=stale generation={}", token.generation());
            return false;
        }

        self.board[token.first()].conceal();
        self.board[token.second()].conceal();
        self.pending_revert = None;
        self.phase = Phase::Idle;
        true
    }

    /// Host callback for the periodic ticker; advances elapsed time.
    pub fn tick(&mut self) {
        if !self.game_over {
            self.elapsed_seconds += 1;
        }
    }

    /// Replaces the board wholesale and restarts counters and timers.
    ///
    /// Bumping the generation invalidates any revert still in flight at the
    /// host, so a stale callback cannot flip cards of the new board.
    pub fn reset(&mut self, pair_count: usize) {
        if let Some(token) = self.pending_revert.take() {
            self.timer.cancel_revert(token);
        }
        self.generation += 1;
        self.board = deck::deal(pair_count);
        self.phase = Phase::Idle;
        self.moves = 0;
        self.elapsed_seconds = 0;
        self.game_over = self.board.is_empty();

        self.timer.stop_ticker();
        if !self.game_over {
            self.timer.start_ticker(TICK_PERIOD);
        }
    }

    pub fn board(&self) -> &[Card] {
        &self.board
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Number of cards whose pair has been found.
    pub fn matched_count(&self) -> usize {
        self.board.iter().filter(|card| card.matched).count()
    }

    /// Current engine generation; bumped on every reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a mismatch resolution is currently in flight.
    pub fn is_evaluating(&self) -> bool {
        matches!(self.phase, Phase::Evaluating { .. })
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }
}
