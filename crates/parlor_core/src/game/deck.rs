//! Board dealing for the matching game.
//!
//! # Responsibility
//! - Build a paired symbol deck and shuffle it uniformly.
//!
//! # Invariants
//! - Every symbol id appears exactly twice in a dealt board.
//! - Board length is `2 * pair_count`; `pair_count == 0` yields the trivial
//!   empty board.
//! - The permutation is uniform over all arrangements. Sorting by a random
//!   comparator is a known-biased pattern and must never replace this.

use crate::model::card::{Board, Card};
use rand::seq::SliceRandom;
use rand::Rng;

/// Deals a shuffled board with `pair_count` symbol pairs.
pub fn deal(pair_count: usize) -> Board {
    deal_with(pair_count, &mut rand::thread_rng())
}

/// Deals with a caller-provided RNG.
///
/// Used by tests and replay paths that need deterministic layouts; the
/// shuffle itself is the `rand` crate's Fisher–Yates.
pub fn deal_with<R: Rng>(pair_count: usize, rng: &mut R) -> Board {
    let mut board: Board = Vec::with_capacity(pair_count * 2);
    for symbol in 0..pair_count {
        board.push(Card::face_down(symbol));
        board.push(Card::face_down(symbol));
    }
    board.shuffle(rng);
    board
}

#[cfg(test)]
mod tests {
    use super::deal;
    use crate::model::card::validate_board;

    #[test]
    fn dealt_board_satisfies_pairing_invariant() {
        for pair_count in [1, 2, 6, 10] {
            let board = deal(pair_count);
            assert_eq!(board.len(), pair_count * 2);
            validate_board(&board).unwrap();
            assert!(board.iter().all(|card| !card.face_up && !card.matched));
        }
    }

    #[test]
    fn zero_pairs_deals_the_trivial_empty_board() {
        assert!(deal(0).is_empty());
    }
}
