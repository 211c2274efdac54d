//! Mapping between world units and grid cells.
//!
//! The board is 2.5 × 5.0 world units centred on the origin, split into
//! 0.25-unit cells: 10 columns and 20 rows. Grid row 0 is the floor
//! (`y = -2.5`) and rows grow upward; column 0 is the left wall
//! (`x = -1.25`).
//!
//! A piece is placed by its *anchor*, the grid cell under its world position.
//! Matrix rows are authored top-down while grid rows grow upward, so matrix
//! cell `(row, col)` of a matrix with `height` rows lands on
//! `(anchor.col + col, anchor.row - row + height)`: the bottom matrix row sits
//! one row above the anchor.

use serde::{Deserialize, Serialize};

use super::{
    grid::{BOARD_COLS, BOARD_ROWS},
    matrix::PieceMatrix,
};

/// Edge length of one grid cell in world units.
pub const CELL_SIZE: f64 = 0.25;
/// Half of the board width in world units.
pub const HALF_WIDTH: f64 = 1.25;
/// Half of the board height in world units.
pub const HALF_HEIGHT: f64 = 2.5;
/// Leftmost legal anchor x.
pub const LEFT_BOUND_X: f64 = -HALF_WIDTH;
/// Rightmost legal anchor x for a piece one cell wide.
pub const RIGHT_BOUND_X: f64 = HALF_WIDTH - CELL_SIZE;

// Absorbs rounding noise so that a position sitting on a cell boundary maps
// to the cell above/right of it.
const SNAP_EPSILON: f64 = 1e-9;

/// A position in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
}

impl WorldPos {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A grid cell. May lie outside the visible board (negative, or above row 19).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GridPos {
    pub col: i32,
    pub row: i32,
}

impl GridPos {
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Returns `true` if the cell is inside the visible 10 × 20 board.
    #[must_use]
    pub fn is_on_board(self) -> bool {
        (0..BOARD_COLS as i32).contains(&self.col) && (0..BOARD_ROWS as i32).contains(&self.row)
    }
}

/// Converts a world position to the grid cell containing it.
///
/// # Example
///
/// ```
/// use cascadris_engine::{GridPos, WorldPos, coords};
///
/// assert_eq!(coords::world_to_grid(WorldPos::new(-1.25, -2.5)), GridPos::new(0, 0));
/// assert_eq!(coords::world_to_grid(WorldPos::new(1.0, 2.25)), GridPos::new(9, 19));
/// assert_eq!(coords::world_to_grid(WorldPos::new(-0.5, 2.5)), GridPos::new(3, 20));
/// ```
#[must_use]
pub fn world_to_grid(pos: WorldPos) -> GridPos {
    GridPos {
        col: axis_to_cell(pos.x, HALF_WIDTH),
        row: axis_to_cell(pos.y, HALF_HEIGHT),
    }
}

/// Converts a grid cell to the world position of its lower-left corner.
///
/// `world_to_grid(grid_to_world(p)) == p` for every cell.
#[must_use]
pub fn grid_to_world(pos: GridPos) -> WorldPos {
    WorldPos {
        x: f64::from(pos.col) * CELL_SIZE - HALF_WIDTH,
        y: f64::from(pos.row) * CELL_SIZE - HALF_HEIGHT,
    }
}

/// Snaps a world position onto the lower-left corner of its cell.
#[must_use]
pub fn snap(pos: WorldPos) -> WorldPos {
    grid_to_world(world_to_grid(pos))
}

/// Rightmost legal anchor x for a piece `width` cells wide.
#[must_use]
pub fn rightmost_x(width: usize) -> f64 {
    let extra = width.saturating_sub(1) as f64;
    RIGHT_BOUND_X - extra * CELL_SIZE
}

#[expect(clippy::cast_possible_truncation)]
fn axis_to_cell(value: f64, half_extent: f64) -> i32 {
    ((value + half_extent) / CELL_SIZE + SNAP_EPSILON).floor() as i32
}

/// Absolute grid cell of every filled matrix cell placed at `anchor`.
///
/// Yields `(matrix_row, matrix_col, grid_pos)`.
pub fn matrix_cells(
    matrix: &PieceMatrix,
    anchor: GridPos,
) -> impl Iterator<Item = (usize, usize, GridPos)> + '_ {
    let height = matrix.height() as i32;
    matrix.filled_cells().map(move |(row, col)| {
        let pos = GridPos {
            col: anchor.col + col as i32,
            row: anchor.row - row as i32 + height,
        };
        (row, col, pos)
    })
}

/// Inverse of [`matrix_cells`]: the matrix cell that would cover `pos`.
///
/// Returns `None` when `pos` is outside the matrix's bounding rows or left of
/// its anchor column.
#[must_use]
pub fn matrix_index(height: usize, anchor: GridPos, pos: GridPos) -> Option<(usize, usize)> {
    let row = usize::try_from(anchor.row + height as i32 - pos.row).ok()?;
    let col = usize::try_from(pos.col - anchor.col).ok()?;
    (row < height).then_some((row, col))
}
