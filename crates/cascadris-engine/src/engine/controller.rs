use crate::core::{
    collision::is_valid_placement,
    coords::{self, CELL_SIZE, GridPos, WorldPos},
    grid::{BOARD_COLS, Grid},
    piece::Piece,
};

/// Result of one fall step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum StepOutcome {
    /// The piece moved down one row.
    Fell,
    /// The piece could not move and is now landed at its last valid row.
    Landed,
}

/// Drives one falling piece until it lands.
///
/// Every move is validated against the grid before it is committed. A
/// rejected move leaves the piece untouched and reports `false`. Once the
/// piece has landed the controller refuses every further move; hand the piece
/// to the grid engine with [`PieceController::into_piece`].
///
/// # Example
///
/// ```
/// use cascadris_engine::{Grid, Piece, PieceController, PieceId, ShapeKind, WorldPos};
///
/// let grid = Grid::EMPTY;
/// let piece = Piece::new(PieceId::FIRST, ShapeKind::O, WorldPos::new(-1.25, -2.75));
/// let mut controller = PieceController::new(piece);
///
/// assert!(!controller.try_move(&grid, -1, 0)); // left wall
/// assert!(controller.try_move(&grid, 1, 0));
/// assert!(controller.step_down(&grid).is_landed());
/// ```
#[derive(Debug, Clone)]
pub struct PieceController {
    piece: Piece,
}

impl PieceController {
    #[must_use]
    pub fn new(piece: Piece) -> Self {
        debug_assert!(piece.status().is_falling());
        Self { piece }
    }

    #[must_use]
    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    #[must_use]
    pub fn into_piece(self) -> Piece {
        self.piece
    }

    #[must_use]
    pub fn is_landed(&self) -> bool {
        self.piece.status().is_landed()
    }

    /// Moves the piece by `dx` columns and `dy` rows if the target is valid.
    pub fn try_move(&mut self, grid: &Grid, dx: i32, dy: i32) -> bool {
        if self.is_landed() {
            return false;
        }
        let position = self.piece.position();
        let target = WorldPos::new(
            position.x + f64::from(dx) * CELL_SIZE,
            position.y + f64::from(dy) * CELL_SIZE,
        );
        if !is_valid_placement(grid, self.piece.matrix(), target) {
            return false;
        }
        self.piece.set_position(target);
        true
    }

    /// Rotates the piece clockwise.
    ///
    /// When the rotated shape would stick out past the right wall, the piece
    /// is pushed left one column at a time until it fits. It is never pushed
    /// right. If no column to the left fits, the rotation is rejected and the
    /// piece keeps its rotation and position.
    pub fn try_rotate(&mut self, grid: &Grid) -> bool {
        if self.is_landed() || self.piece.is_custom() {
            return false;
        }
        let rotation = self.piece.rotation().rotated_clockwise();
        let matrix = self.piece.kind().matrix(rotation);
        let anchor = self.piece.anchor();
        let position = self.piece.position();

        let rightmost_col = BOARD_COLS.saturating_sub(matrix.effective_width()) as i32;
        let target = if anchor.col <= rightmost_col {
            is_valid_placement(grid, &matrix, position).then_some(position)
        } else {
            (0..anchor.col).rev().find_map(|col| {
                let shifted = WorldPos::new(
                    coords::grid_to_world(GridPos::new(col, anchor.row)).x,
                    position.y,
                );
                is_valid_placement(grid, &matrix, shifted).then_some(shifted)
            })
        };

        let Some(target) = target else {
            log::trace!("rotation of piece {} rejected", self.piece.id());
            return false;
        };
        self.piece.set_rotation(rotation, matrix);
        self.piece.set_position(target);
        true
    }

    /// Returns `true` if the piece could move one row down.
    #[must_use]
    pub fn can_fall(&self, grid: &Grid) -> bool {
        !self.is_landed() && is_valid_placement(grid, self.piece.matrix(), self.below())
    }

    /// Moves the piece one row down, or lands it where it is.
    ///
    /// The fall target is the grid row below the piece's current row, so a
    /// piece between rows snaps onto the grid as it falls.
    pub fn step_down(&mut self, grid: &Grid) -> StepOutcome {
        if self.is_landed() {
            return StepOutcome::Landed;
        }
        let target = self.below();
        if is_valid_placement(grid, self.piece.matrix(), target) {
            self.piece.set_position(target);
            return StepOutcome::Fell;
        }
        self.piece.land();
        log::debug!(
            "piece {} ({}) landed at {:?}",
            self.piece.id(),
            self.piece.kind(),
            self.piece.anchor()
        );
        StepOutcome::Landed
    }

    /// Position the piece would land at if it fell straight down now.
    #[must_use]
    pub fn drop_preview(&self, grid: &Grid) -> WorldPos {
        let anchor = self.piece.anchor();
        let at_row = |row| {
            let y = coords::grid_to_world(GridPos::new(anchor.col, row)).y;
            WorldPos::new(self.piece.position().x, y)
        };
        let mut row = anchor.row;
        while is_valid_placement(grid, self.piece.matrix(), at_row(row - 1)) {
            row -= 1;
        }
        at_row(row)
    }

    fn below(&self) -> WorldPos {
        let anchor = self.piece.anchor();
        let row = coords::grid_to_world(GridPos::new(anchor.col, anchor.row - 1));
        WorldPos::new(self.piece.position().x, row.y)
    }
}
