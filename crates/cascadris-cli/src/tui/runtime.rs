use std::{io, time::Duration};

use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
};

use crate::tui::{
    App,
    event::TuiEvent,
    event_loop::{EventLoop, RenderMode},
};

/// Terminal session running one [`App`].
#[derive(Debug)]
pub struct Tui {
    events: EventLoop,
}

impl Default for Tui {
    fn default() -> Self {
        Self::new()
    }
}

impl Tui {
    pub fn new() -> Self {
        Self {
            events: EventLoop::new(),
        }
    }

    /// Ticks per second, or `None` for no ticks.
    pub fn set_tick_rate(&mut self, rate: Option<f64>) {
        self.events
            .set_tick_interval(rate.map(|rate| Duration::from_secs_f64(1.0 / rate)));
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.events.set_render_mode(mode);
    }

    /// Takes over the terminal and runs `app` until it asks to exit.
    ///
    /// Focus change reporting is enabled so that apps see
    /// `Event::FocusLost` and `Event::FocusGained`.
    pub fn run<A>(mut self, app: &mut A) -> io::Result<()>
    where
        A: App,
    {
        app.init(&mut self);

        ratatui::run(|terminal| {
            execute!(io::stdout(), EnableFocusChange)?;
            let result = self.event_loop(app, terminal);
            execute!(io::stdout(), DisableFocusChange)?;
            result
        })
    }

    fn event_loop<A>(&mut self, app: &mut A, terminal: &mut ratatui::DefaultTerminal) -> io::Result<()>
    where
        A: App,
    {
        while !app.should_exit() {
            match self.events.next()? {
                TuiEvent::Tick(elapsed) => app.update(self, elapsed),
                TuiEvent::Render => {
                    terminal.draw(|f| app.draw(f))?;
                }
                TuiEvent::Crossterm(event) => app.handle_event(self, event),
            }
        }
        Ok(())
    }
}
