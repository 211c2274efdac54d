use std::time::Duration;

use cascadris_engine::{GameSession, Intent, RankedScore, SessionEvent, SessionState};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Text,
};

use crate::{
    tui::{App, RenderMode, Tui},
    ui::widgets::SessionDisplay,
};

const FPS: f64 = 60.0;

/// Delay before re-reading the table after game over, so the background
/// submission has a chance to land.
const SCORES_REFRESH_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct PlayApp {
    session: GameSession,
    scores: Vec<RankedScore>,
    refresh_in: Option<Duration>,
    is_exiting: bool,
}

impl PlayApp {
    pub fn new(session: GameSession) -> Self {
        let scores = session.fetch_high_scores();
        Self {
            session,
            scores,
            refresh_in: None,
            is_exiting: false,
        }
    }

    fn apply(&mut self, intent: Intent) {
        let events = self.session.handle_intent(intent);
        self.observe(&events);
    }

    fn observe(&mut self, events: &[SessionEvent]) {
        if events
            .iter()
            .any(|e| matches!(e, SessionEvent::GameOver { .. }))
        {
            self.refresh_in = Some(SCORES_REFRESH_DELAY);
        }
    }

    fn intent_for(state: SessionState, code: KeyCode) -> Option<Intent> {
        let intent = match (state, code) {
            (SessionState::Start, KeyCode::Enter) => Intent::Start,
            (SessionState::Playing, KeyCode::Left) => Intent::MoveLeft,
            (SessionState::Playing, KeyCode::Right) => Intent::MoveRight,
            (SessionState::Playing, KeyCode::Up) => Intent::Rotate,
            (SessionState::Playing, KeyCode::Down) => Intent::SoftDrop,
            (SessionState::Playing | SessionState::Paused, KeyCode::Char('p')) => {
                Intent::TogglePause
            }
            (_, KeyCode::Char('r')) => Intent::Restart,
            _ => return None,
        };
        Some(intent)
    }

    fn help_text(state: SessionState) -> &'static str {
        match state {
            SessionState::Start => "Controls: Enter (Start) | Q (Quit)",
            SessionState::Playing => {
                "Controls: ← → (Move) | ↑ (Rotate) | ↓ (Soft Drop) | P (Pause) | R (Restart) | Q (Quit)"
            }
            SessionState::Paused => "Controls: P (Resume) | R (Restart) | Q (Quit)",
            SessionState::GameOver => "Controls: R (Restart) | Q (Quit)",
        }
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(Some(FPS));
        tui.set_render_mode(RenderMode::throttled_from_rate(FPS));
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: Event) {
        match event {
            Event::FocusLost => self.apply(Intent::Pause),
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                if key.code == KeyCode::Char('q') {
                    self.is_exiting = true;
                } else if let Some(intent) = Self::intent_for(self.session.state(), key.code) {
                    self.apply(intent);
                }
            }
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let display = SessionDisplay::new(&self.session, &self.scores);
        let help_text = Text::from(Self::help_text(self.session.state()))
            .style(Style::default().fg(Color::DarkGray))
            .centered();

        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(23), Constraint::Length(1)]).areas(frame.area());
        frame.render_widget(display, main_area);
        frame.render_widget(help_text, help_area);
    }

    fn update(&mut self, _tui: &mut Tui, elapsed: Duration) {
        let events = self.session.advance(elapsed);
        self.observe(&events);

        if let Some(remaining) = self.refresh_in {
            if remaining > elapsed {
                self.refresh_in = Some(remaining - elapsed);
            } else {
                self.refresh_in = None;
                self.scores = self.session.fetch_high_scores();
            }
        }
    }
}
