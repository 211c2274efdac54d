use std::time::Duration;

use rand::Rng as _;

use crate::{
    core::{
        coords::{self, GridPos},
        grid::{BOARD_ROWS, Grid, PieceId},
        piece::{Piece, PieceView},
        shape::ShapeKind,
    },
    scoreboard::{self, NewScore, RankedScore, Scoreboard},
};

use super::{
    config::{ConfigError, SessionConfig},
    controller::PieceController,
    game_stats::GameStats,
    grid_engine::{ClearCascade, GridEngine},
    piece_generator::{PieceGenerator, PieceSeed},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Start,
    Playing,
    Paused,
    GameOver,
}

/// A discrete player action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Start,
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    Pause,
    Resume,
    TogglePause,
    Restart,
}

/// Something the session did that a front end may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Spawned { piece: PieceId, kind: ShapeKind },
    Landed { piece: PieceId, cascade: ClearCascade },
    GameOver { score: u32 },
}

/// One game from the start screen to game over.
///
/// The session is driven from outside: [`GameSession::advance`] feeds it
/// elapsed time, [`GameSession::handle_intent`] feeds it player actions. Only
/// one piece falls at a time, and the next one spawns after the previous
/// landing and its clear cascade have been fully applied.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use cascadris_engine::{GameSession, Intent, OfflineScoreboard, SessionConfig};
///
/// let mut session = GameSession::new(SessionConfig::default(), Box::new(OfflineScoreboard)).unwrap();
/// assert!(session.state().is_start());
///
/// session.handle_intent(Intent::Start);
/// assert!(session.state().is_playing());
/// let before = session.active_piece().unwrap().anchor();
///
/// session.advance(Duration::from_millis(500));
/// assert_eq!(session.active_piece().unwrap().anchor().row, before.row - 1);
/// ```
#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    generator: PieceGenerator,
    engine: GridEngine,
    active: Option<PieceController>,
    state: SessionState,
    stats: GameStats,
    next_id: PieceId,
    fall_elapsed: Duration,
    spawn_countdown: Option<Duration>,
    scoreboard: Box<dyn Scoreboard>,
    score_submitted: bool,
}

fn session_seed(config: &SessionConfig) -> PieceSeed {
    config.seed.unwrap_or_else(|| rand::rng().random())
}

impl GameSession {
    pub fn new(config: SessionConfig, scoreboard: Box<dyn Scoreboard>) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = PieceGenerator::new(&config.piece_kinds, session_seed(&config))?;
        Ok(Self {
            config,
            generator,
            engine: GridEngine::new(),
            active: None,
            state: SessionState::Start,
            stats: GameStats::new(),
            next_id: PieceId::FIRST,
            fall_elapsed: Duration::ZERO,
            spawn_countdown: None,
            scoreboard,
            score_submitted: false,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        self.engine.grid()
    }

    #[must_use]
    pub fn engine(&self) -> &GridEngine {
        &self.engine
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        self.active.as_ref().map(PieceController::piece)
    }

    /// Returns `true` while waiting out the delay before the next spawn.
    #[must_use]
    pub fn is_spawn_pending(&self) -> bool {
        self.spawn_countdown.is_some()
    }

    /// Views of every live piece: landed pieces first, the falling one last.
    #[must_use]
    pub fn piece_views(&self) -> Vec<PieceView> {
        self.engine
            .pieces()
            .iter()
            .chain(self.active_piece())
            .map(Piece::view)
            .collect()
    }

    /// View of the falling piece moved to where it would land.
    #[must_use]
    pub fn drop_preview(&self) -> Option<PieceView> {
        let controller = self.active.as_ref()?;
        let mut view = controller.piece().view();
        view.position = controller.drop_preview(self.engine.grid());
        Some(view)
    }

    /// Current high-score table, empty if the scoreboard is unreachable.
    #[must_use]
    pub fn fetch_high_scores(&self) -> Vec<RankedScore> {
        scoreboard::fetch_or_empty(self.scoreboard.as_ref())
    }

    pub fn handle_intent(&mut self, intent: Intent) -> Vec<SessionEvent> {
        match intent {
            Intent::Start => return self.start(),
            Intent::MoveLeft => {
                self.try_move(-1);
            }
            Intent::MoveRight => {
                self.try_move(1);
            }
            Intent::Rotate => {
                self.try_rotate();
            }
            Intent::SoftDrop => return self.soft_drop(),
            Intent::Pause => self.pause(),
            Intent::Resume => self.resume(),
            Intent::TogglePause => self.toggle_pause(),
            Intent::Restart => return self.restart(),
        }
        vec![]
    }

    /// Leaves the start screen and spawns the first piece.
    pub fn start(&mut self) -> Vec<SessionEvent> {
        if !self.state.is_start() {
            return vec![];
        }
        log::info!("game started");
        self.state = SessionState::Playing;
        vec![self.spawn()]
    }

    pub fn pause(&mut self) {
        if self.state.is_playing() {
            log::debug!("paused");
            self.state = SessionState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state.is_paused() {
            log::debug!("resumed");
            self.state = SessionState::Playing;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            SessionState::Playing => self.pause(),
            SessionState::Paused => self.resume(),
            SessionState::Start | SessionState::GameOver => {}
        }
    }

    /// Throws the current game away and starts a new one.
    pub fn restart(&mut self) -> Vec<SessionEvent> {
        log::info!("game restarted");
        self.generator.reseed(session_seed(&self.config));
        self.engine = GridEngine::new();
        self.active = None;
        self.stats = GameStats::new();
        self.next_id = PieceId::FIRST;
        self.fall_elapsed = Duration::ZERO;
        self.spawn_countdown = None;
        self.score_submitted = false;
        self.state = SessionState::Playing;
        vec![self.spawn()]
    }

    /// Moves the falling piece `dx` columns sideways.
    pub fn try_move(&mut self, dx: i32) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        self.active
            .as_mut()
            .is_some_and(|active| active.try_move(self.engine.grid(), dx, 0))
    }

    pub fn try_rotate(&mut self) -> bool {
        if !self.state.is_playing() {
            return false;
        }
        self.active
            .as_mut()
            .is_some_and(|active| active.try_rotate(self.engine.grid()))
    }

    /// Drops the falling piece one row now and restarts the fall timer.
    pub fn soft_drop(&mut self) -> Vec<SessionEvent> {
        if !self.state.is_playing() {
            return vec![];
        }
        let Some(active) = self.active.as_mut() else {
            return vec![];
        };
        self.fall_elapsed = Duration::ZERO;
        if active.step_down(self.engine.grid()).is_landed() {
            return self.finish_landing();
        }
        vec![]
    }

    /// Advances the session clock by `elapsed` of wall time.
    ///
    /// Does nothing unless playing, so paused time never counts towards a
    /// fall step or the spawn delay.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<SessionEvent> {
        if !self.state.is_playing() {
            return vec![];
        }
        self.stats.add_play_time(elapsed);

        if let Some(remaining) = self.spawn_countdown {
            if elapsed < remaining {
                self.spawn_countdown = Some(remaining - elapsed);
                return vec![];
            }
            self.spawn_countdown = None;
            return vec![self.spawn()];
        }

        let mut events = vec![];
        let interval = self.config.fall_interval();
        self.fall_elapsed += elapsed;
        while self.fall_elapsed >= interval {
            self.fall_elapsed -= interval;
            let Some(active) = self.active.as_mut() else {
                break;
            };
            if active.step_down(self.engine.grid()).is_landed() {
                self.fall_elapsed = Duration::ZERO;
                events.extend(self.finish_landing());
                break;
            }
        }
        events
    }

    fn spawn(&mut self) -> SessionEvent {
        debug_assert!(self.active.is_none(), "one falling piece at a time");
        let id = self.next_id;
        self.next_id = id.next();
        let kind = self.generator.next_kind();
        let anchor = GridPos::new(self.config.spawn_column as i32, BOARD_ROWS as i32);
        let piece = Piece::new(id, kind, coords::grid_to_world(anchor));
        self.active = Some(PieceController::new(piece));
        self.fall_elapsed = Duration::ZERO;
        log::debug!("spawned piece {id} ({kind})");
        SessionEvent::Spawned { piece: id, kind }
    }

    /// Commits the landed piece, runs the cascade and decides what comes next.
    fn finish_landing(&mut self) -> Vec<SessionEvent> {
        let Some(controller) = self.active.take() else {
            return vec![];
        };
        let piece = controller.into_piece();
        let id = piece.id();
        let report = self.engine.commit(piece);
        let cascade = self.engine.clear_completed_rows();
        self.stats.record_landing(&cascade);
        debug_assert!(self.engine.check_ownership().is_ok());

        let mut events = vec![SessionEvent::Landed { piece: id, cascade }];
        if report.highest_row >= self.config.fatal_row() {
            events.push(self.game_over());
        } else if self.config.spawn_delay().is_zero() {
            events.push(self.spawn());
        } else {
            self.spawn_countdown = Some(self.config.spawn_delay());
        }
        events
    }

    fn game_over(&mut self) -> SessionEvent {
        let score = self.stats.score();
        log::info!(
            "game over: score {score}, {} rows in {} pieces",
            self.stats.cleared_rows(),
            self.stats.landed_pieces()
        );
        self.state = SessionState::GameOver;
        self.submit_final_score();
        SessionEvent::GameOver { score }
    }

    fn submit_final_score(&mut self) {
        if self.score_submitted {
            return;
        }
        self.score_submitted = true;
        let entry = NewScore {
            name: self.config.player_name.clone(),
            score: i32::try_from(self.stats.score()).unwrap_or(i32::MAX),
        };
        if let Err(e) = self.scoreboard.submit_score(&entry) {
            log::warn!("failed to submit score: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::scoreboard::ScoreboardError;

    #[derive(Debug, Default, Clone)]
    struct RecordingScoreboard {
        submitted: Arc<Mutex<Vec<NewScore>>>,
        fail: bool,
    }

    impl Scoreboard for RecordingScoreboard {
        fn fetch_scores(&self) -> Result<Vec<RankedScore>, ScoreboardError> {
            if self.fail {
                return Err(ScoreboardError::Timeout);
            }
            Ok(vec![RankedScore {
                name: "top".to_owned(),
                score: 100,
                rank: 1,
            }])
        }

        fn submit_score(&self, score: &NewScore) -> Result<(), ScoreboardError> {
            self.submitted.lock().unwrap().push(score.clone());
            if self.fail {
                return Err(ScoreboardError::Status { status: 500 });
            }
            Ok(())
        }
    }

    fn config(kinds: &[ShapeKind]) -> SessionConfig {
        SessionConfig {
            piece_kinds: kinds.to_vec(),
            seed: Some(PieceSeed::from(42)),
            ..SessionConfig::default()
        }
    }

    fn playing(config: SessionConfig, scoreboard: RecordingScoreboard) -> GameSession {
        let mut session = GameSession::new(config, Box::new(scoreboard)).unwrap();
        session.start();
        session
    }

    fn drop_to_landing(session: &mut GameSession) -> Vec<SessionEvent> {
        for _ in 0..64 {
            let events = session.soft_drop();
            if !events.is_empty() {
                return events;
            }
        }
        panic!("piece never landed");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = GameSession::new(config(&[]), Box::new(RecordingScoreboard::default()));
        assert!(matches!(err, Err(ConfigError::EmptyPieceSet)));
    }

    #[test]
    fn test_nothing_happens_before_start() {
        let mut session =
            GameSession::new(config(&[ShapeKind::O]), Box::new(RecordingScoreboard::default()))
                .unwrap();
        assert!(session.advance(Duration::from_secs(5)).is_empty());
        assert!(session.handle_intent(Intent::SoftDrop).is_empty());
        assert!(session.active_piece().is_none());
        assert_eq!(session.stats().play_time(), Duration::ZERO);
    }

    #[test]
    fn test_start_spawns_first_piece() {
        let mut session =
            GameSession::new(config(&[ShapeKind::T]), Box::new(RecordingScoreboard::default()))
                .unwrap();
        let events = session.handle_intent(Intent::Start);
        assert_eq!(
            events,
            vec![SessionEvent::Spawned {
                piece: PieceId::FIRST,
                kind: ShapeKind::T,
            }]
        );
        let piece = session.active_piece().unwrap();
        assert_eq!(piece.anchor(), GridPos::new(3, 20));
        assert!(session.handle_intent(Intent::Start).is_empty());
    }

    #[test]
    fn test_fall_steps_follow_interval() {
        let mut session = playing(config(&[ShapeKind::O]), RecordingScoreboard::default());
        session.advance(Duration::from_millis(499));
        assert_eq!(session.active_piece().unwrap().anchor().row, 20);
        session.advance(Duration::from_millis(1));
        assert_eq!(session.active_piece().unwrap().anchor().row, 19);
        session.advance(Duration::from_millis(1000));
        assert_eq!(session.active_piece().unwrap().anchor().row, 17);
    }

    #[test]
    fn test_pause_keeps_state_and_fall_progress() {
        let mut session = playing(config(&[ShapeKind::O]), RecordingScoreboard::default());
        session.advance(Duration::from_millis(300));
        session.handle_intent(Intent::Pause);
        assert!(session.state().is_paused());
        let views = session.piece_views();

        assert!(session.advance(Duration::from_secs(10)).is_empty());
        assert!(!session.try_move(-1));
        assert_eq!(session.piece_views(), views);
        assert_eq!(session.stats().play_time(), Duration::from_millis(300));

        session.handle_intent(Intent::TogglePause);
        assert!(session.state().is_playing());
        session.advance(Duration::from_millis(199));
        assert_eq!(session.active_piece().unwrap().anchor().row, 20);
        session.advance(Duration::from_millis(1));
        assert_eq!(session.active_piece().unwrap().anchor().row, 19);
    }

    #[test]
    fn test_spawn_delay_after_landing() {
        let mut session = playing(config(&[ShapeKind::O]), RecordingScoreboard::default());
        let events = drop_to_landing(&mut session);
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Landed { piece, .. }] if *piece == PieceId::FIRST
        ));
        assert!(session.active_piece().is_none());
        assert!(session.is_spawn_pending());

        assert!(session.advance(Duration::from_millis(499)).is_empty());
        let events = session.advance(Duration::from_millis(1));
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Spawned { piece, .. }] if *piece == PieceId::new(2)
        ));
        assert_eq!(session.stats().landed_pieces(), 1);
    }

    #[test]
    fn test_moves_and_rotation_through_intents() {
        let mut session = playing(config(&[ShapeKind::I]), RecordingScoreboard::default());
        session.handle_intent(Intent::MoveLeft);
        assert_eq!(session.active_piece().unwrap().anchor().col, 2);
        session.handle_intent(Intent::MoveRight);
        session.handle_intent(Intent::MoveRight);
        assert_eq!(session.active_piece().unwrap().anchor().col, 4);
        session.handle_intent(Intent::Rotate);
        assert_eq!(session.active_piece().unwrap().rotation().quarter_turns(), 1);
    }

    #[test]
    fn test_drop_preview_matches_landing() {
        let mut session = playing(config(&[ShapeKind::L]), RecordingScoreboard::default());
        let preview = session.drop_preview().unwrap();
        drop_to_landing(&mut session);
        let landed = session.piece_views();
        assert_eq!(landed.len(), 1);
        assert_eq!(landed[0].position, preview.position);
        assert!(landed[0].landed);
    }

    #[test]
    fn test_game_over_submits_once() {
        let scoreboard = RecordingScoreboard::default();
        let submitted = Arc::clone(&scoreboard.submitted);
        let config = SessionConfig {
            spawn_delay_ms: 0,
            player_name: "ann".to_owned(),
            ..config(&[ShapeKind::O])
        };
        let mut session = playing(config, scoreboard);

        // every O stacks on column 3; the tenth reaches the top margin
        let mut last = vec![];
        for _ in 0..10 {
            assert!(session.state().is_playing());
            last = drop_to_landing(&mut session);
        }
        assert!(session.state().is_game_over());
        assert!(matches!(last.last(), Some(SessionEvent::GameOver { score: 0 })));
        assert!(session.active_piece().is_none());

        assert!(session.advance(Duration::from_secs(10)).is_empty());
        assert!(session.handle_intent(Intent::SoftDrop).is_empty());
        session.handle_intent(Intent::TogglePause);
        assert!(session.state().is_game_over());

        let submitted = submitted.lock().unwrap();
        assert_eq!(
            *submitted,
            vec![NewScore {
                name: "ann".to_owned(),
                score: 0,
            }]
        );
    }

    #[test]
    fn test_failed_submission_is_not_fatal() {
        let scoreboard = RecordingScoreboard {
            fail: true,
            ..RecordingScoreboard::default()
        };
        let submitted = Arc::clone(&scoreboard.submitted);
        let config = SessionConfig {
            spawn_delay_ms: 0,
            top_margin_rows: 20,
            ..config(&[ShapeKind::O])
        };
        let mut session = playing(config, scoreboard);
        drop_to_landing(&mut session);
        assert!(session.state().is_game_over());
        assert_eq!(submitted.lock().unwrap().len(), 1);
        assert!(session.fetch_high_scores().is_empty());
    }

    #[test]
    fn test_restart_resets_everything() {
        let scoreboard = RecordingScoreboard::default();
        let mut session = playing(config(&[ShapeKind::O]), scoreboard);
        assert_eq!(session.fetch_high_scores().len(), 1);
        drop_to_landing(&mut session);
        session.advance(Duration::from_millis(500));
        assert_eq!(session.active_piece().unwrap().id(), PieceId::new(2));

        let events = session.handle_intent(Intent::Restart);
        assert_eq!(
            events,
            vec![SessionEvent::Spawned {
                piece: PieceId::FIRST,
                kind: ShapeKind::O,
            }]
        );
        assert_eq!(session.grid().occupied_count(), 0);
        assert!(session.engine().pieces().is_empty());
        assert_eq!(session.stats().landed_pieces(), 0);
        assert!(session.state().is_playing());
    }
}
