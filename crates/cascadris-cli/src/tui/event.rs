use std::time::Duration;

use crossterm::event::Event as CrosstermEvent;

#[derive(Debug, Clone, derive_more::IsVariant, derive_more::From)]
pub(super) enum TuiEvent {
    /// Time to update, with the wall time elapsed since the previous tick.
    #[from(ignore)]
    Tick(Duration),
    Render,
    Crossterm(CrosstermEvent),
}
