//! Interface to the remote high-score service.
//!
//! The engine only needs two calls: fetch the ranking and submit a final
//! score. Both are best effort. A session never fails because the service is
//! unreachable; use [`fetch_or_empty`] where a missing table should read as
//! an empty one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Body of a score submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScore {
    pub name: String,
    pub score: i32,
}

/// One row of the high-score table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedScore {
    pub name: String,
    pub score: i32,
    /// 1 + number of entries with a strictly higher score.
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ScoreboardError {
    #[display("scoreboard unreachable: {message}")]
    Transport { message: String },
    #[display("scoreboard answered with status {status}")]
    Status { status: u16 },
    #[display("malformed scoreboard response: {message}")]
    Decode { message: String },
    #[display("scoreboard timed out")]
    Timeout,
    #[display("scoreboard is disabled")]
    Disabled,
}

/// A high-score service.
pub trait Scoreboard: fmt::Debug + Send {
    /// Returns the ranked table, best first.
    fn fetch_scores(&self) -> Result<Vec<RankedScore>, ScoreboardError>;

    /// Submits a final score.
    ///
    /// Implementations may return before the submission has been delivered.
    fn submit_score(&self, score: &NewScore) -> Result<(), ScoreboardError>;
}

/// A scoreboard that is never reachable. Used when playing offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineScoreboard;

impl Scoreboard for OfflineScoreboard {
    fn fetch_scores(&self) -> Result<Vec<RankedScore>, ScoreboardError> {
        Err(ScoreboardError::Disabled)
    }

    fn submit_score(&self, _score: &NewScore) -> Result<(), ScoreboardError> {
        Err(ScoreboardError::Disabled)
    }
}

/// Fetches the table, substituting an empty one on failure.
pub fn fetch_or_empty(scoreboard: &dyn Scoreboard) -> Vec<RankedScore> {
    scoreboard.fetch_scores().unwrap_or_else(|e| {
        log::warn!("failed to fetch high scores: {e}");
        vec![]
    })
}
