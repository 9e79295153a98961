use parlor_core::{
    Card, Difficulty, GameSession, MatchEngine, RevertToken, SelectOutcome, TimerPort,
    MISMATCH_REVERT_DELAY, TICK_PERIOD,
};
use std::time::Duration;

#[test]
fn two_pair_game_plays_to_completion() {
    // Layout [A, A, B, B]: select both As, then both Bs.
    let mut engine = engine_with_layout(&[0, 0, 1, 1]);

    assert_eq!(engine.select(0), SelectOutcome::FirstRevealed { index: 0 });
    assert_eq!(
        engine.select(1),
        SelectOutcome::Matched {
            first: 0,
            second: 1,
            game_over: false
        }
    );
    assert_eq!(engine.moves(), 1);
    assert!(engine.board()[0].matched && engine.board()[1].matched);

    engine.select(2);
    assert_eq!(
        engine.select(3),
        SelectOutcome::Matched {
            first: 2,
            second: 3,
            game_over: true
        }
    );
    assert_eq!(engine.moves(), 2);
    assert!(engine.is_game_over());
    assert_eq!(engine.matched_count(), engine.board().len());
    assert!(engine.board().iter().all(|card| card.face_up));
}

#[test]
fn game_over_stops_the_ticker() {
    let mut engine = engine_with_layout(&[0, 0]);
    assert!(engine.timer().ticker_running);

    engine.select(0);
    engine.select(1);

    assert!(engine.is_game_over());
    assert!(!engine.timer().ticker_running);
}

#[test]
fn mismatch_keeps_cards_up_until_the_revert_fires() {
    let mut engine = engine_with_layout(&[0, 1, 0, 1]);

    engine.select(0);
    assert_eq!(
        engine.select(1),
        SelectOutcome::Mismatched { first: 0, second: 1 }
    );
    assert_eq!(engine.moves(), 1);
    assert!(engine.is_evaluating());
    assert!(engine.board()[0].face_up && engine.board()[1].face_up);

    // The engine asked the host for exactly one revert at the fixed delay.
    let (delay, token) = *engine.timer().scheduled.last().unwrap();
    assert_eq!(delay, MISMATCH_REVERT_DELAY);
    assert_eq!(delay, Duration::from_millis(1000));

    // Clicking ahead during resolution is rejected, not queued.
    assert_eq!(engine.select(2), SelectOutcome::Rejected);
    assert!(!engine.board()[2].face_up);

    assert!(engine.revert_due(token));
    assert!(!engine.board()[0].face_up && !engine.board()[1].face_up);
    assert!(!engine.is_evaluating());
    assert_eq!(engine.moves(), 1);

    // Board is live again after the revert.
    assert_eq!(engine.select(2), SelectOutcome::FirstRevealed { index: 2 });
}

#[test]
fn invalid_selections_are_silent_no_ops() {
    let mut engine = engine_with_layout(&[0, 0, 1, 1]);

    // Out of range.
    assert_eq!(engine.select(99), SelectOutcome::Rejected);

    // Re-clicking the sole pending card.
    engine.select(0);
    assert_eq!(engine.select(0), SelectOutcome::Rejected);

    // Clicking an already matched card.
    engine.select(1);
    let before = engine.board().to_vec();
    assert_eq!(engine.select(0), SelectOutcome::Rejected);
    assert_eq!(engine.select(1), SelectOutcome::Rejected);
    assert_eq!(engine.moves(), 1);
    assert_eq!(engine.board(), &before[..]);

    // No selection after completion.
    engine.select(2);
    engine.select(3);
    assert!(engine.is_game_over());
    assert_eq!(engine.select(2), SelectOutcome::Rejected);
}

#[test]
fn reset_cancels_the_pending_revert_and_stale_tokens_are_dropped() {
    let mut engine = engine_with_layout(&[0, 1, 0, 1]);

    engine.select(0);
    engine.select(1);
    let (_, stale_token) = *engine.timer().scheduled.last().unwrap();

    engine.reset(2);
    assert!(engine.timer().cancelled.contains(&stale_token));
    assert_eq!(engine.moves(), 0);
    assert_eq!(engine.elapsed_seconds(), 0);
    assert!(engine.board().iter().all(|card| !card.face_up));

    // The late callback still arrives; it must not flip the new board.
    assert!(!engine.revert_due(stale_token));
    assert!(engine.board().iter().all(|card| !card.face_up));

    // A token forged for the new generation is equally ignored.
    let forged = RevertToken::new(engine.generation(), 0, 1);
    assert!(!engine.revert_due(forged));
}

#[test]
fn tick_advances_only_while_the_game_runs() {
    let mut engine = engine_with_layout(&[0, 0]);
    assert_eq!(engine.elapsed_seconds(), 0);

    engine.tick();
    engine.tick();
    assert_eq!(engine.elapsed_seconds(), 2);

    engine.select(0);
    engine.select(1);
    assert!(engine.is_game_over());

    engine.tick();
    assert_eq!(engine.elapsed_seconds(), 2);
}

#[test]
fn empty_board_is_complete_from_the_start() {
    let engine = MatchEngine::new(0, RecordingTimer::default());
    assert!(engine.is_game_over());
    assert_eq!(engine.timer().ticker_starts, 0);
}

#[test]
fn caller_provided_layouts_are_validated() {
    let odd = vec![Card::face_down(0)];
    assert!(MatchEngine::with_board(odd, RecordingTimer::default()).is_err());

    let unpaired = vec![
        Card::face_down(0),
        Card::face_down(0),
        Card::face_down(1),
        Card::face_down(2),
    ];
    assert!(MatchEngine::with_board(unpaired, RecordingTimer::default()).is_err());
}

#[test]
fn session_snapshot_never_leaks_hidden_symbols() {
    let mut session = GameSession::new(Difficulty::Easy, RecordingTimer::default());

    let snapshot = session.snapshot();
    assert_eq!(snapshot.cards.len(), Difficulty::Easy.pair_count() * 2);
    assert!(snapshot.cards.iter().all(|card| card.symbol.is_none()));

    session.select(0);
    let snapshot = session.snapshot();
    assert!(snapshot.cards[0].symbol.is_some());
    assert_eq!(
        snapshot.cards.iter().filter(|c| c.symbol.is_some()).count(),
        1
    );
}

#[test]
fn changing_difficulty_replaces_the_board_wholesale() {
    let mut session = GameSession::new(Difficulty::Easy, RecordingTimer::default());
    session.select(0);
    session.tick();

    session.change_difficulty(Difficulty::Hard);

    let snapshot = session.snapshot();
    assert_eq!(snapshot.difficulty, Difficulty::Hard);
    assert_eq!(snapshot.cards.len(), Difficulty::Hard.pair_count() * 2);
    assert_eq!(snapshot.moves, 0);
    assert_eq!(snapshot.elapsed_seconds, 0);
    assert!(snapshot.cards.iter().all(|card| !card.face_up));
}

fn engine_with_layout(symbols: &[usize]) -> MatchEngine<RecordingTimer> {
    let board = symbols.iter().map(|&s| Card::face_down(s)).collect();
    MatchEngine::with_board(board, RecordingTimer::default()).unwrap()
}

/// Manual timer double: records every request instead of keeping time.
#[derive(Debug, Default)]
struct RecordingTimer {
    scheduled: Vec<(Duration, RevertToken)>,
    cancelled: Vec<RevertToken>,
    ticker_running: bool,
    ticker_starts: u32,
}

impl TimerPort for RecordingTimer {
    fn schedule_revert(&mut self, delay: Duration, token: RevertToken) {
        self.scheduled.push((delay, token));
    }

    fn cancel_revert(&mut self, token: RevertToken) {
        self.cancelled.push(token);
    }

    fn start_ticker(&mut self, period: Duration) {
        assert_eq!(period, TICK_PERIOD);
        self.ticker_running = true;
        self.ticker_starts += 1;
    }

    fn stop_ticker(&mut self) {
        self.ticker_running = false;
    }
}
