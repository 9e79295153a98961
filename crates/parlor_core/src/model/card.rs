//! Card and board domain model.
//!
//! # Responsibility
//! - Define the canonical card record shared by every matching-game view.
//! - Provide lifecycle helpers for flip and match transitions.
//!
//! # Invariants
//! - Exactly two cards on a board share one `SymbolId`.
//! - A matched card is permanently face-up and excluded from selection.
//! - Board length is always even; boards are replaced wholesale, never
//!   partially resized.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifier of the hidden symbol printed on a pair of cards.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type SymbolId = usize;

/// Full card sequence of one game instance.
///
/// Position in the vector is the card's stable index for the whole game.
pub type Board = Vec<Card>;

/// One cell of the matching-game board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Which pair this card belongs to.
    pub symbol: SymbolId,
    /// Whether the card currently shows its symbol.
    pub face_up: bool,
    /// Whether the card's partner has been found.
    pub matched: bool,
}

impl Card {
    /// Creates a face-down, unmatched card for `symbol`.
    pub fn face_down(symbol: SymbolId) -> Self {
        Self {
            symbol,
            face_up: false,
            matched: false,
        }
    }

    /// Turns the card face-up.
    pub fn reveal(&mut self) {
        self.face_up = true;
    }

    /// Turns the card back face-down unless its pair was already found.
    pub fn conceal(&mut self) {
        if !self.matched {
            self.face_up = false;
        }
    }

    /// Locks the card as matched; matched cards stay face-up for good.
    pub fn settle(&mut self) {
        self.matched = true;
        self.face_up = true;
    }

    /// Returns whether this card may still take part in a selection.
    pub fn is_selectable(&self) -> bool {
        !self.matched
    }
}

/// Board sizing presets exposed by the game UIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// 6 pairs, 12 cards.
    Easy,
    /// 8 pairs, 16 cards.
    Medium,
    /// 10 pairs, 20 cards.
    Hard,
}

impl Difficulty {
    /// Number of symbol pairs a board of this difficulty carries.
    pub fn pair_count(self) -> usize {
        match self {
            Self::Easy => 6,
            Self::Medium => 8,
            Self::Hard => 10,
        }
    }
}

/// Structural problems in a caller-provided board layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardLayoutError {
    /// Board length is not even.
    OddLength(usize),
    /// A symbol does not appear exactly twice.
    UnpairedSymbol(SymbolId),
}

impl Display for BoardLayoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddLength(len) => write!(f, "board length {len} is not even"),
            Self::UnpairedSymbol(symbol) => {
                write!(f, "symbol {symbol} does not appear exactly twice")
            }
        }
    }
}

impl Error for BoardLayoutError {}

/// Checks the pairing invariant on a board layout.
///
/// Used by engine constructors that accept caller-provided layouts; boards
/// produced by the dealer satisfy this by construction.
pub fn validate_board(board: &Board) -> Result<(), BoardLayoutError> {
    if board.len() % 2 != 0 {
        return Err(BoardLayoutError::OddLength(board.len()));
    }

    let mut occurrences: BTreeMap<SymbolId, usize> = BTreeMap::new();
    for card in board {
        *occurrences.entry(card.symbol).or_insert(0) += 1;
    }
    for (symbol, count) in occurrences {
        if count != 2 {
            return Err(BoardLayoutError::UnpairedSymbol(symbol));
        }
    }

    Ok(())
}
