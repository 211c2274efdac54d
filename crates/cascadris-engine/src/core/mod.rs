//! Board geometry: shapes, matrices, coordinates, the occupancy grid and
//! placement checks.

pub use self::{
    collision::*,
    coords::{GridPos, WorldPos},
    grid::*,
    matrix::*,
    piece::*,
    shape::*,
};

pub(crate) mod collision;
pub mod coords;
pub(crate) mod grid;
pub(crate) mod matrix;
pub(crate) mod piece;
pub(crate) mod shape;
