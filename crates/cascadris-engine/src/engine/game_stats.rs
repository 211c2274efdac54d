use std::time::Duration;

use super::grid_engine::ClearCascade;

/// Session statistics.
///
/// - **Score**: [`SCORE_PER_ROW`](super::SCORE_PER_ROW) per cleared row
/// - **Landed pieces**: pieces committed to the grid
/// - **Cleared rows**: total rows removed
/// - **Cascade histogram**: landings by number of rows they cleared
/// - **Play time**: time spent playing, pauses excluded
///
/// # Example
///
/// ```
/// use cascadris_engine::{ClearCascade, GameStats};
///
/// let mut stats = GameStats::new();
/// stats.record_landing(&ClearCascade::default());
///
/// assert_eq!(stats.score(), 0);
/// assert_eq!(stats.landed_pieces(), 1);
/// assert_eq!(stats.cascade_counter()[0], 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GameStats {
    score: u32,
    landed_pieces: usize,
    cleared_rows: usize,
    cascade_counter: [usize; 5],
    play_time: Duration,
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            landed_pieces: 0,
            cleared_rows: 0,
            cascade_counter: [0; 5],
            play_time: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub const fn landed_pieces(&self) -> usize {
        self.landed_pieces
    }

    #[must_use]
    pub const fn cleared_rows(&self) -> usize {
        self.cleared_rows
    }

    /// Landings by rows cleared.
    ///
    /// `[0]` counts landings that cleared nothing, `[4]` those that cleared
    /// four or more rows.
    #[must_use]
    pub const fn cascade_counter(&self) -> &[usize; 5] {
        &self.cascade_counter
    }

    #[must_use]
    pub const fn play_time(&self) -> Duration {
        self.play_time
    }

    /// Updates the counters after a landing and its cascade.
    pub fn record_landing(&mut self, cascade: &ClearCascade) {
        let rows = cascade.rows_cleared();
        self.landed_pieces += 1;
        self.cleared_rows += rows;
        self.cascade_counter[rows.min(self.cascade_counter.len() - 1)] += 1;
        self.score = self.score.saturating_add(cascade.score_delta());
    }

    pub(crate) fn add_play_time(&mut self, elapsed: Duration) {
        self.play_time += elapsed;
    }
}
