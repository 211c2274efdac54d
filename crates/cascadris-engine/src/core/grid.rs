use std::collections::BTreeSet;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::{coords::GridPos, piece::Piece};

/// Number of columns of the visible board.
pub const BOARD_COLS: usize = 10;
/// Number of rows of the visible board.
pub const BOARD_ROWS: usize = 20;

/// Unique identifier of a piece within one session.
///
/// Ids start at 1, grow by one per spawn and are never reused.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("#{_0}")]
pub struct PieceId(u32);

impl PieceId {
    pub const FIRST: Self = Self(1);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// One cell of the occupancy grid.
///
/// A cell is occupied exactly when it has an owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    owner: Option<PieceId>,
}

impl Cell {
    pub const EMPTY: Self = Self { owner: None };

    #[must_use]
    pub fn is_occupied(self) -> bool {
        self.owner.is_some()
    }

    #[must_use]
    pub fn owner(self) -> Option<PieceId> {
        self.owner
    }
}

type Row = [Cell; BOARD_COLS];

const EMPTY_ROW: Row = [Cell::EMPTY; BOARD_COLS];

/// The 10 × 20 occupancy grid.
///
/// `rows[0]` is the floor. The grid mirrors the `occupied_cells` of the landed
/// pieces; [`Grid::from_pieces`] rebuilds it from that authoritative record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: [Row; BOARD_ROWS],
}

impl Default for Grid {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Grid {
    pub const COLS: usize = BOARD_COLS;
    pub const ROWS: usize = BOARD_ROWS;

    pub const EMPTY: Self = Self {
        rows: [EMPTY_ROW; BOARD_ROWS],
    };

    /// Builds a grid from the occupied cells of `pieces`.
    pub fn from_pieces<'a, I>(pieces: I) -> Self
    where
        I: IntoIterator<Item = &'a Piece>,
    {
        let mut grid = Self::EMPTY;
        for piece in pieces {
            for &pos in piece.occupied_cells() {
                grid.occupy(pos, piece.id());
            }
        }
        grid
    }

    /// Returns the cell at `pos`, or `None` outside the visible board.
    #[must_use]
    pub fn cell(&self, pos: GridPos) -> Option<Cell> {
        let (col, row) = Self::index(pos)?;
        Some(self.rows[row][col])
    }

    /// Returns `true` if `pos` is on the board and occupied.
    #[must_use]
    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.cell(pos).is_some_and(Cell::is_occupied)
    }

    /// Marks `pos` as owned by `owner`. Cells off the board are ignored.
    pub(crate) fn occupy(&mut self, pos: GridPos, owner: PieceId) {
        if let Some((col, row)) = Self::index(pos) {
            debug_assert!(
                !self.rows[row][col].is_occupied(),
                "cell {pos:?} already owned by {:?}",
                self.rows[row][col].owner
            );
            self.rows[row][col] = Cell { owner: Some(owner) };
        }
    }

    /// Rows whose every cell is occupied, highest row first.
    #[must_use]
    pub fn completed_rows(&self) -> ArrayVec<usize, BOARD_ROWS> {
        (0..BOARD_ROWS)
            .rev()
            .filter(|&row| self.rows[row].iter().all(|cell| cell.is_occupied()))
            .collect()
    }

    /// Removes `row`; rows above move down and an empty row enters at the top.
    pub(crate) fn remove_row(&mut self, row: usize) {
        self.rows[row..].rotate_left(1);
        self.rows[BOARD_ROWS - 1] = EMPTY_ROW;
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.rows.iter().flatten().filter(|c| c.is_occupied()).count()
    }

    /// Every occupied cell with its owner, bottom row first.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (GridPos, PieceId)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(col, cell)| {
                cell.owner
                    .map(|owner| (GridPos::new(col as i32, row as i32), owner))
            })
        })
    }

    /// Set view of [`Grid::occupied_cells`].
    #[must_use]
    pub fn ownership(&self) -> BTreeSet<(GridPos, PieceId)> {
        self.occupied_cells().collect()
    }

    /// Rows from the top of the board down, for drawing.
    pub fn rows_top_down(&self) -> impl Iterator<Item = &[Cell; BOARD_COLS]> {
        self.rows.iter().rev()
    }

    /// Number of rows from the floor up to the highest occupied cell.
    #[must_use]
    pub fn stack_height(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| row.iter().any(|c| c.is_occupied()))
            .map_or(0, |row| row + 1)
    }

    fn index(pos: GridPos) -> Option<(usize, usize)> {
        if !pos.is_on_board() {
            return None;
        }
        Some((pos.col as usize, pos.row as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(grid: &mut Grid, row: i32, owner: PieceId) {
        for col in 0..BOARD_COLS as i32 {
            grid.occupy(GridPos::new(col, row), owner);
        }
    }

    #[test]
    fn test_empty_grid() {
        let grid = Grid::EMPTY;
        assert_eq!(grid.occupied_count(), 0);
        assert!(grid.completed_rows().is_empty());
        assert_eq!(grid.stack_height(), 0);
        assert_eq!(grid.cell(GridPos::new(10, 0)), None);
        assert!(!grid.is_occupied(GridPos::new(0, 25)));
    }

    #[test]
    fn test_occupy_and_owner() {
        let mut grid = Grid::EMPTY;
        grid.occupy(GridPos::new(3, 4), PieceId::new(7));
        grid.occupy(GridPos::new(3, 21), PieceId::new(7));
        assert!(grid.is_occupied(GridPos::new(3, 4)));
        assert_eq!(
            grid.cell(GridPos::new(3, 4)).and_then(Cell::owner),
            Some(PieceId::new(7))
        );
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.stack_height(), 5);
    }

    #[test]
    fn test_completed_rows_highest_first() {
        let mut grid = Grid::EMPTY;
        fill_row(&mut grid, 0, PieceId::new(1));
        fill_row(&mut grid, 2, PieceId::new(2));
        fill_row(&mut grid, 5, PieceId::new(3));
        grid.occupy(GridPos::new(0, 1), PieceId::new(4));
        assert_eq!(grid.completed_rows().as_slice(), &[5, 2, 0]);
    }

    #[test]
    fn test_remove_row_inserts_empty_top() {
        let mut grid = Grid::EMPTY;
        fill_row(&mut grid, 0, PieceId::new(1));
        grid.occupy(GridPos::new(4, 1), PieceId::new(2));
        grid.occupy(GridPos::new(4, 19), PieceId::new(3));
        grid.remove_row(0);
        assert_eq!(grid.occupied_count(), 2);
        assert!(grid.is_occupied(GridPos::new(4, 0)));
        assert!(grid.is_occupied(GridPos::new(4, 18)));
        assert!(!grid.is_occupied(GridPos::new(4, 19)));
    }

    #[test]
    fn test_piece_id_display() {
        assert_eq!(PieceId::FIRST.to_string(), "#1");
        assert_eq!(PieceId::FIRST.next(), PieceId::new(2));
    }
}
