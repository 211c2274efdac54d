pub use self::{core::*, engine::*, scoreboard::*};

pub mod core;
pub mod engine;
pub mod scoreboard;

/// Grid cells whose owner disagrees with the landed pieces' records.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("grid ownership disagrees with piece cells at {cells:?}")]
pub struct OwnershipMismatch {
    pub cells: Vec<GridPos>,
}
