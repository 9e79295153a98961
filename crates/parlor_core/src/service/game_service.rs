//! Matching-game use-case session.
//!
//! # Responsibility
//! - Wrap the engine with difficulty handling and restart semantics.
//! - Produce render snapshots that never leak hidden symbols.

use crate::game::engine::{MatchEngine, RevertToken, SelectOutcome, TimerPort};
use crate::model::card::{Difficulty, SymbolId};

/// One card as a rendering host may see it.
///
/// `symbol` is only present while the card is visible, so a snapshot cannot
/// be mined for hidden pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardView {
    pub symbol: Option<SymbolId>,
    pub face_up: bool,
    pub matched: bool,
}

/// Full render state of a running game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub cards: Vec<CardView>,
    pub moves: u32,
    pub elapsed_seconds: u64,
    pub game_over: bool,
    pub difficulty: Difficulty,
    pub generation: u64,
}

/// Use-case façade over one matching game.
pub struct GameSession<T: TimerPort> {
    engine: MatchEngine<T>,
    difficulty: Difficulty,
}

impl<T: TimerPort> GameSession<T> {
    /// Starts a session at the given difficulty.
    pub fn new(difficulty: Difficulty, timer: T) -> Self {
        Self {
            engine: MatchEngine::new(difficulty.pair_count(), timer),
            difficulty,
        }
    }

    /// Forwards one card click to the engine.
    pub fn select(&mut self, index: usize) -> SelectOutcome {
        self.engine.select(index)
    }

    /// Forwards the one-shot revert callback.
    pub fn revert_due(&mut self, token: RevertToken) -> bool {
        self.engine.revert_due(token)
    }

    /// Forwards the periodic ticker callback.
    pub fn tick(&mut self) {
        self.engine.tick();
    }

    /// Restarts at the current difficulty with a fresh shuffled board.
    pub fn restart(&mut self) {
        self.engine.reset(self.difficulty.pair_count());
    }

    /// Switches difficulty; the board is replaced wholesale.
    pub fn change_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.engine.reset(difficulty.pair_count());
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Builds the render snapshot for the host.
    pub fn snapshot(&self) -> GameSnapshot {
        let cards = self
            .engine
            .board()
            .iter()
            .map(|card| CardView {
                symbol: card.face_up.then_some(card.symbol),
                face_up: card.face_up,
                matched: card.matched,
            })
            .collect();

        GameSnapshot {
            cards,
            moves: self.engine.moves(),
            elapsed_seconds: self.engine.elapsed_seconds(),
            game_over: self.engine.is_game_over(),
            difficulty: self.difficulty,
            generation: self.engine.generation(),
        }
    }

    pub fn engine(&self) -> &MatchEngine<T> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut MatchEngine<T> {
        &mut self.engine
    }
}
