use super::{
    coords::{self, WorldPos},
    grid::{BOARD_COLS, BOARD_ROWS, Grid},
    matrix::PieceMatrix,
};

/// Checks whether `matrix` placed at `position` fits on `grid`.
///
/// Every filled cell must lie in a board column and between the floor and
/// `BOARD_ROWS + height` rows up. Cells above the visible board always fit;
/// cells on the board must be unoccupied.
///
/// # Example
///
/// ```
/// use cascadris_engine::{Grid, PieceMatrix, WorldPos, is_valid_placement};
///
/// let o = PieceMatrix::parse(&["##", "##"]);
/// assert!(is_valid_placement(&Grid::EMPTY, &o, WorldPos::new(-1.25, -2.75)));
/// // one cell past the right wall
/// assert!(!is_valid_placement(&Grid::EMPTY, &o, WorldPos::new(1.0, 0.0)));
/// ```
#[must_use]
pub fn is_valid_placement(grid: &Grid, matrix: &PieceMatrix, position: WorldPos) -> bool {
    let anchor = coords::world_to_grid(position);
    let ceiling = (BOARD_ROWS + matrix.height()) as i32;
    coords::matrix_cells(matrix, anchor).all(|(_, _, pos)| {
        if !(0..BOARD_COLS as i32).contains(&pos.col) || !(0..=ceiling).contains(&pos.row) {
            return false;
        }
        pos.row >= BOARD_ROWS as i32 || !grid.is_occupied(pos)
    })
}
