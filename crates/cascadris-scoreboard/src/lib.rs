//! High-score service for cascadris.
//!
//! [`router`] and [`serve`] expose a [`ScoreStore`] over HTTP. [`ScoreClient`]
//! talks to that service, and [`HttpScoreboard`] adapts it to the engine's
//! blocking [`Scoreboard`](cascadris_engine::Scoreboard) interface.

pub use self::{client::*, server::*, store::*};

mod client;
mod server;
mod store;
