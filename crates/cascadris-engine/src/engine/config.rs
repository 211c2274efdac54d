use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{
    grid::{BOARD_COLS, BOARD_ROWS},
    shape::ShapeKind,
};

use super::piece_generator::PieceSeed;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("at least one piece kind must be enabled")]
    EmptyPieceSet,
    #[display("fall interval must be greater than zero")]
    ZeroFallInterval,
    #[display("spawn column {column} leaves no room for a {kind} piece")]
    SpawnColumnOutOfRange { column: usize, kind: ShapeKind },
    #[display("top margin of {rows} rows exceeds the board height")]
    TopMarginTooLarge { rows: usize },
}

/// Tunables of a game session.
///
/// Every field has a default, so a configuration file only needs to name the
/// fields it changes:
///
/// ```
/// use cascadris_engine::{SessionConfig, ShapeKind};
///
/// let config: SessionConfig =
///     serde_json::from_str(r#"{ "piece_kinds": ["O", "I"], "fall_interval_ms": 250 }"#).unwrap();
/// assert_eq!(config.piece_kinds, vec![ShapeKind::O, ShapeKind::I]);
/// assert_eq!(config.spawn_delay_ms, 500);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Kinds spawned, each with equal probability.
    pub piece_kinds: Vec<ShapeKind>,
    /// Time for a falling piece to drop one row.
    pub fall_interval_ms: u64,
    /// Grid column of a spawned piece's anchor.
    pub spawn_column: usize,
    /// Playing time between a landing and the next spawn.
    pub spawn_delay_ms: u64,
    /// Rows at the top of the board where a landing ends the game.
    pub top_margin_rows: usize,
    /// Name submitted with the final score.
    pub player_name: String,
    /// Fixed seed for a reproducible piece sequence.
    pub seed: Option<PieceSeed>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            piece_kinds: vec![
                ShapeKind::T,
                ShapeKind::L,
                ShapeKind::I,
                ShapeKind::O,
                ShapeKind::J,
            ],
            fall_interval_ms: 500,
            spawn_column: 3,
            spawn_delay_ms: 500,
            top_margin_rows: 2,
            player_name: "anonymous".to_owned(),
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.piece_kinds.is_empty() {
            return Err(ConfigError::EmptyPieceSet);
        }
        if self.fall_interval_ms == 0 {
            return Err(ConfigError::ZeroFallInterval);
        }
        if let Some(&kind) = self
            .piece_kinds
            .iter()
            .find(|kind| self.spawn_column + kind.base_matrix().effective_width() > BOARD_COLS)
        {
            return Err(ConfigError::SpawnColumnOutOfRange {
                column: self.spawn_column,
                kind,
            });
        }
        if self.top_margin_rows > BOARD_ROWS {
            return Err(ConfigError::TopMarginTooLarge {
                rows: self.top_margin_rows,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn fall_interval(&self) -> Duration {
        Duration::from_millis(self.fall_interval_ms)
    }

    #[must_use]
    pub fn spawn_delay(&self) -> Duration {
        Duration::from_millis(self.spawn_delay_ms)
    }

    /// Lowest grid row of the fatal top margin.
    #[must_use]
    pub fn fatal_row(&self) -> i32 {
        (BOARD_ROWS - self.top_margin_rows) as i32
    }
}
