use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex},
    time::Duration,
};

use cascadris_engine::{
    GameSession, GameStats, GridEngine, GridPos, Intent, NewScore, Piece, PieceController,
    PieceId, PieceSeed, RankedScore, Scoreboard, ScoreboardError, SessionConfig, SessionEvent,
    ShapeKind, coords,
};
use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

#[derive(Debug, Default, Clone)]
struct RecordingScoreboard {
    submitted: Arc<Mutex<Vec<NewScore>>>,
}

impl Scoreboard for RecordingScoreboard {
    fn fetch_scores(&self) -> Result<Vec<RankedScore>, ScoreboardError> {
        Ok(vec![])
    }

    fn submit_score(&self, score: &NewScore) -> Result<(), ScoreboardError> {
        self.submitted.lock().unwrap().push(score.clone());
        Ok(())
    }
}

fn session(kinds: &[ShapeKind], spawn_column: usize) -> (GameSession, RecordingScoreboard) {
    let scoreboard = RecordingScoreboard::default();
    let config = SessionConfig {
        piece_kinds: kinds.to_vec(),
        spawn_column,
        spawn_delay_ms: 0,
        seed: Some(PieceSeed::from(0x5eed)),
        ..SessionConfig::default()
    };
    let mut session = GameSession::new(config, Box::new(scoreboard.clone())).unwrap();
    session.handle_intent(Intent::Start);
    (session, scoreboard)
}

/// Soft-drops the falling piece until it lands.
fn land(session: &mut GameSession) -> Vec<SessionEvent> {
    for _ in 0..64 {
        let events = session.handle_intent(Intent::SoftDrop);
        if !events.is_empty() {
            return events;
        }
    }
    panic!("piece never landed");
}

/// Spawns `kind` above column `col` and lets it fall onto the stack.
fn drop_piece(engine: &mut GridEngine, id: u32, kind: ShapeKind, col: i32) -> PieceId {
    let spawn = coords::grid_to_world(GridPos::new(col, 20));
    let mut controller = PieceController::new(Piece::new(PieceId::new(id), kind, spawn));
    while controller.step_down(engine.grid()).is_fell() {}
    engine.commit(controller.into_piece()).piece
}

fn assert_consistent(engine: &GridEngine) {
    engine.check_ownership().unwrap();
    for piece in engine.pieces() {
        assert!(!piece.occupied_cells().is_empty(), "empty piece {}", piece.id());
        let covered = piece
            .covered_cells()
            .filter(|p| p.is_on_board())
            .collect::<BTreeSet<_>>();
        assert_eq!(&covered, piece.occupied_cells(), "piece {}", piece.id());
    }
}

#[test]
fn test_four_squares_complete_the_floor_row() {
    let mut engine = GridEngine::new();
    let mut stats = GameStats::new();

    // J in the two rightmost columns fills the floor but not the row above
    drop_piece(&mut engine, 1, ShapeKind::J, 8);
    for (i, col) in [0, 2, 4, 6].into_iter().enumerate() {
        assert!(engine.find_completed_rows().is_empty());
        drop_piece(&mut engine, 2 + i as u32, ShapeKind::O, col);
        assert_consistent(&engine);
    }
    assert_eq!(engine.occupied_count(), 20);

    let cascade = engine.clear_completed_rows();
    stats.record_landing(&cascade);
    assert_eq!(cascade.rows_cleared(), 1);
    assert_eq!(stats.score(), 10);
    assert_eq!(engine.occupied_count(), 10);
    assert_eq!(engine.pieces().len(), 5);
    assert!(engine.pieces().iter().all(Piece::is_custom));
    assert_consistent(&engine);

    // upper halves of the squares fell to the floor
    for col in 0..8 {
        assert!(engine.grid().is_occupied(GridPos::new(col, 0)));
        assert!(!engine.grid().is_occupied(GridPos::new(col, 1)));
    }
}

#[test]
fn test_simultaneous_rows_score_in_one_cascade() {
    let (mut session, _) = session(&[ShapeKind::O], 0);
    for moves in [0, 2, 4, 6] {
        for _ in 0..moves {
            session.handle_intent(Intent::MoveRight);
        }
        let events = land(&mut session);
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Landed { cascade, .. }, SessionEvent::Spawned { .. }] if cascade.is_empty()
        ));
        assert_eq!(session.stats().score(), 0);
    }

    for _ in 0..8 {
        session.handle_intent(Intent::MoveRight);
    }
    let events = land(&mut session);
    let SessionEvent::Landed { cascade, .. } = &events[0] else {
        panic!("expected a landing, got {events:?}");
    };
    assert_eq!(cascade.rows_cleared(), 2);
    assert_eq!(cascade.score_delta(), 20);
    assert_eq!(session.stats().score(), 20);
    assert_eq!(session.stats().cascade_counter()[2], 1);
    assert_eq!(session.grid().occupied_count(), 0);
    assert!(session.engine().pieces().is_empty());
}

#[test]
fn test_rotation_at_right_wall_shifts_left() {
    let (mut session, _) = session(&[ShapeKind::I], 3);
    for _ in 0..10 {
        session.handle_intent(Intent::MoveRight);
    }
    assert_eq!(session.active_piece().unwrap().anchor().col, 9);

    assert!(session.try_rotate());
    let piece = session.active_piece().unwrap();
    assert_eq!(piece.anchor().col, 6);
    assert_eq!(piece.matrix().effective_width(), 4);
}

#[test]
fn test_rotation_without_room_is_rejected() {
    let mut engine = GridEngine::new();
    for (id, col) in [0, 3, 6, 8].into_iter().enumerate() {
        drop_piece(&mut engine, id as u32 + 1, ShapeKind::I, col);
    }

    // vertical bar just above the floor at the right wall
    let low = coords::grid_to_world(GridPos::new(9, 0));
    let mut controller = PieceController::new(Piece::new(PieceId::new(5), ShapeKind::I, low));
    let before = controller.piece().clone();
    assert!(!controller.try_rotate(engine.grid()));
    assert_eq!(controller.piece(), &before);

    // higher up every column is free and the bar is pushed in from the wall
    let high = coords::grid_to_world(GridPos::new(9, 10));
    let mut controller = PieceController::new(Piece::new(PieceId::new(6), ShapeKind::I, high));
    assert!(controller.try_rotate(engine.grid()));
    assert_eq!(controller.piece().anchor(), GridPos::new(6, 10));
}

#[test]
fn test_fully_cleared_piece_is_removed() {
    let mut engine = GridEngine::new();
    let mut id = 1;
    for col in [0, 4] {
        let spawn = coords::grid_to_world(GridPos::new(col, 20));
        let mut controller = PieceController::new(Piece::new(PieceId::new(id), ShapeKind::I, spawn));
        assert!(controller.try_rotate(engine.grid()));
        while controller.step_down(engine.grid()).is_fell() {}
        engine.commit(controller.into_piece());
        id += 1;
    }
    drop_piece(&mut engine, 3, ShapeKind::O, 8);

    let cascade = engine.clear_completed_rows();
    assert_eq!(cascade.rows_cleared(), 1);
    assert_eq!(
        cascade.steps()[0].removed,
        vec![PieceId::new(1), PieceId::new(2)]
    );
    assert_eq!(engine.pieces().len(), 1);
    assert_eq!(engine.pieces()[0].id(), PieceId::new(3));
    assert_eq!(engine.occupied_count(), 2);
    assert_consistent(&engine);
}

#[test]
fn test_reaching_the_top_margin_ends_the_game_once() {
    let (mut session, scoreboard) = session(&[ShapeKind::I], 3);
    for _ in 0..4 {
        land(&mut session);
        assert!(session.state().is_playing());
    }
    // the fifth bar covers rows 16..=19
    let events = land(&mut session);
    assert!(matches!(
        events.as_slice(),
        [SessionEvent::Landed { .. }, SessionEvent::GameOver { score: 0 }]
    ));
    assert!(session.state().is_game_over());

    session.handle_intent(Intent::SoftDrop);
    session.handle_intent(Intent::Start);
    session.advance(Duration::from_secs(60));
    assert_eq!(scoreboard.submitted.lock().unwrap().len(), 1);

    // a new game may submit again
    session.handle_intent(Intent::Restart);
    for _ in 0..5 {
        land(&mut session);
    }
    assert!(session.state().is_game_over());
    assert_eq!(scoreboard.submitted.lock().unwrap().len(), 2);
}

#[test]
fn test_random_play_keeps_grid_and_pieces_in_sync() {
    let (mut session, _) = session(&ShapeKind::ALL, 3);
    let mut rng = Pcg32::seed_from_u64(7);
    let mut landings = 0;

    for _ in 0..20_000 {
        if session.state().is_game_over() {
            break;
        }
        let intent = match rng.random_range(0..5) {
            0 => Intent::MoveLeft,
            1 => Intent::MoveRight,
            2 => Intent::Rotate,
            3 => Intent::SoftDrop,
            _ => {
                session.advance(Duration::from_millis(250));
                continue;
            }
        };
        for event in session.handle_intent(intent) {
            if matches!(event, SessionEvent::Landed { .. }) {
                landings += 1;
                assert_consistent(session.engine());
            }
        }
    }
    assert!(landings >= 5);
    assert_consistent(session.engine());
}
