use std::collections::BTreeSet;

use super::{
    coords::{self, CELL_SIZE, GridPos, WorldPos},
    grid::PieceId,
    matrix::PieceMatrix,
    shape::{PieceRotation, ShapeKind},
};

/// Lifecycle of a piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum PieceStatus {
    /// Controlled by the player; owns no grid cells.
    Falling,
    /// Committed to the grid; only the clear cascade may change it.
    Landed,
    /// Every cell has been cleared. Dropped from the active set.
    Removed,
}

/// What a renderer needs to draw one piece.
#[derive(Debug, Clone, PartialEq)]
pub struct PieceView {
    pub id: PieceId,
    /// Picks the colour. The geometry is `matrix`.
    pub kind: ShapeKind,
    pub matrix: PieceMatrix,
    pub rotation: PieceRotation,
    /// Lower-left corner of the anchor cell, in world units.
    pub position: WorldPos,
    pub landed: bool,
}

/// A falling or landed piece.
///
/// Geometry comes from `kind` + `rotation` until a clear cascade cuts the
/// piece. From then on the piece carries a frozen custom matrix and its kind
/// only picks its colour.
///
/// # Example
///
/// ```
/// use cascadris_engine::{Piece, PieceId, ShapeKind, WorldPos};
///
/// let piece = Piece::new(PieceId::FIRST, ShapeKind::O, WorldPos::new(-1.25, 2.5));
/// assert!(piece.status().is_falling());
/// assert!(piece.occupied_cells().is_empty());
/// assert_eq!(piece.matrix().to_string(), "##\n##");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    id: PieceId,
    kind: ShapeKind,
    rotation: PieceRotation,
    matrix: PieceMatrix,
    custom: bool,
    position: WorldPos,
    status: PieceStatus,
    occupied_cells: BTreeSet<GridPos>,
}

impl Piece {
    #[must_use]
    pub fn new(id: PieceId, kind: ShapeKind, position: WorldPos) -> Self {
        let rotation = PieceRotation::default();
        Self {
            id,
            kind,
            rotation,
            matrix: kind.matrix(rotation),
            custom: false,
            position,
            status: PieceStatus::Falling,
            occupied_cells: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> PieceId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    /// Current shape, derived or custom.
    #[must_use]
    pub fn matrix(&self) -> &PieceMatrix {
        &self.matrix
    }

    /// The frozen matrix of a piece that has been cut by a clear.
    #[must_use]
    pub fn custom_matrix(&self) -> Option<&PieceMatrix> {
        self.custom.then_some(&self.matrix)
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    #[must_use]
    pub fn position(&self) -> WorldPos {
        self.position
    }

    /// Grid cell under the piece's world position.
    #[must_use]
    pub fn anchor(&self) -> GridPos {
        coords::world_to_grid(self.position)
    }

    #[must_use]
    pub fn status(&self) -> PieceStatus {
        self.status
    }

    /// Grid cells owned by this piece. Empty unless landed.
    #[must_use]
    pub fn occupied_cells(&self) -> &BTreeSet<GridPos> {
        &self.occupied_cells
    }

    /// Cells covered by the matrix at the current position, on or off the board.
    pub fn covered_cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        coords::matrix_cells(&self.matrix, self.anchor()).map(|(_, _, pos)| pos)
    }

    #[must_use]
    pub fn view(&self) -> PieceView {
        PieceView {
            id: self.id,
            kind: self.kind,
            matrix: self.matrix.clone(),
            rotation: self.rotation,
            position: self.position,
            landed: !self.status.is_falling(),
        }
    }

    pub(crate) fn set_position(&mut self, position: WorldPos) {
        self.position = position;
    }

    pub(crate) fn set_rotation(&mut self, rotation: PieceRotation, matrix: PieceMatrix) {
        debug_assert!(!self.custom, "custom pieces never rotate");
        self.rotation = rotation;
        self.matrix = matrix;
    }

    /// Marks the piece as landed, snapping it onto its grid cell.
    pub(crate) fn land(&mut self) {
        debug_assert!(self.status.is_falling());
        self.position = coords::snap(self.position);
        self.status = PieceStatus::Landed;
    }

    pub(crate) fn claim_cell(&mut self, pos: GridPos) {
        self.occupied_cells.insert(pos);
    }

    /// Blanks the matrix cells covering `cells` and releases them.
    ///
    /// Blank rows are trimmed off both ends of the matrix; if nothing is left
    /// the piece becomes [`PieceStatus::Removed`]. Otherwise the remaining
    /// shape is frozen as a custom matrix. Trimming bottom rows raises the
    /// anchor so the remaining cells keep their place.
    pub(crate) fn cut(&mut self, cells: &[GridPos]) {
        let anchor = self.anchor();
        let height = self.matrix.height();
        for &pos in cells {
            if let Some((row, col)) = coords::matrix_index(height, anchor, pos) {
                self.matrix.clear_cell(row, col);
            }
            self.occupied_cells.remove(&pos);
        }

        let (_, bottom) = self.matrix.trim_blank_rows();
        if self.matrix.is_blank() {
            self.status = PieceStatus::Removed;
            self.occupied_cells.clear();
            return;
        }
        self.custom = true;
        self.position.y += bottom as f64 * CELL_SIZE;
    }

    /// Applies the gravity shift after `row` was removed from the grid.
    ///
    /// Cells above `row` move down one row. A piece lying wholly above moves
    /// as a unit; a piece straddling `row` keeps its lower cells and its
    /// shape is rebuilt from the cells it still owns. Returns `true` if
    /// anything moved.
    pub(crate) fn settle_above(&mut self, row: i32) -> bool {
        let above = self.occupied_cells.iter().filter(|p| p.row > row).count();
        if above == 0 {
            return false;
        }
        self.occupied_cells = self
            .occupied_cells
            .iter()
            .map(|&p| {
                if p.row > row {
                    GridPos::new(p.col, p.row - 1)
                } else {
                    p
                }
            })
            .collect();

        if above == self.occupied_cells.len() {
            self.position.y -= CELL_SIZE;
        } else {
            self.reshape_from_cells();
        }
        true
    }

    /// Rebuilds the matrix and anchor from `occupied_cells`.
    fn reshape_from_cells(&mut self) {
        let (Some(min_col), Some(min_row), Some(max_row)) = (
            self.occupied_cells.iter().map(|p| p.col).min(),
            self.occupied_cells.iter().map(|p| p.row).min(),
            self.occupied_cells.iter().map(|p| p.row).max(),
        ) else {
            return;
        };
        let max_col = self
            .occupied_cells
            .iter()
            .map(|p| p.col)
            .max()
            .unwrap_or(min_col);
        let cells = &self.occupied_cells;
        self.matrix = PieceMatrix::from_rows((min_row..=max_row).rev().map(|row| {
            (min_col..=max_col).map(move |col| cells.contains(&GridPos::new(col, row)))
        }));
        self.custom = true;
        let height = self.matrix.height() as i32;
        self.position = coords::grid_to_world(GridPos::new(min_col, max_row - height));
    }
}
