//! Game flow on top of the board geometry.
//!
//! - [`PieceController`] - moves, rotates and lands one falling piece
//! - [`GridEngine`] - commits landed pieces and runs the row clear cascade
//! - [`GameSession`] - spawning, timing, pause/restart and game over
//! - [`GameStats`] - score and counters
//! - [`PieceGenerator`] - seeded uniform choice of the next piece kind
//! - [`SessionConfig`] - tunables
//!
//! # Game Flow
//!
//! 1. [`GameSession::start`] spawns the first piece above the board
//! 2. Player intents move and rotate it; elapsed time makes it fall
//! 3. When it can fall no further it lands and is committed to the grid
//! 4. Completed rows are cleared, highest first, cutting and shifting the
//!    landed pieces
//! 5. After the spawn delay the next piece appears, unless the landing
//!    reached the top margin, which ends the game

pub use self::{
    config::*, controller::*, game_session::*, game_stats::*, grid_engine::*,
    piece_generator::*,
};

mod config;
mod controller;
mod game_session;
mod game_stats;
mod grid_engine;
mod piece_generator;
