use std::time::Duration;

use crossterm::event::Event;
use ratatui::Frame;

use crate::tui::Tui;

/// An application driven by [`Tui::run`].
pub trait App {
    /// Called once before the first event. Configure tick and render rates here.
    fn init(&mut self, tui: &mut Tui);

    fn should_exit(&self) -> bool;

    /// Handles terminal events (keys, focus changes, resize).
    fn handle_event(&mut self, tui: &mut Tui, event: Event);

    fn draw(&self, frame: &mut Frame);

    /// Advances the application by the wall time since the previous tick.
    fn update(&mut self, tui: &mut Tui, elapsed: Duration);
}
