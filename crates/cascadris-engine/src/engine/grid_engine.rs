use std::collections::BTreeSet;

use crate::{
    OwnershipMismatch,
    core::{
        coords::GridPos,
        grid::{BOARD_COLS, Grid, PieceId},
        piece::Piece,
    },
};

/// Points awarded per cleared row.
pub const SCORE_PER_ROW: u32 = 10;

/// What [`GridEngine::commit`] did with a landed piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReport {
    pub piece: PieceId,
    /// Cells written to the grid.
    pub cells: usize,
    /// Cells above the visible board that were not written.
    pub clipped: usize,
    /// Highest grid row covered by the piece, on or above the board.
    pub highest_row: i32,
}

/// One row removal of a clear cascade.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearStep {
    pub row: usize,
    /// Pieces that lost cells in this row and still have cells left.
    pub split: Vec<PieceId>,
    /// Pieces that lost their last cell in this row.
    pub removed: Vec<PieceId>,
    /// Pieces with cells that moved down a row.
    pub shifted: Vec<PieceId>,
}

/// Every row removal triggered by one landing, in processing order.
///
/// A renderer that wants to pace the cascade replays [`ClearCascade::steps`];
/// the engine state already reflects all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearCascade {
    steps: Vec<ClearStep>,
}

impl ClearCascade {
    #[must_use]
    pub fn steps(&self) -> &[ClearStep] {
        &self.steps
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn rows_cleared(&self) -> usize {
        self.steps.len()
    }

    /// Score earned by the whole cascade.
    #[must_use]
    pub fn score_delta(&self) -> u32 {
        SCORE_PER_ROW * u32::try_from(self.steps.len()).unwrap_or(u32::MAX / SCORE_PER_ROW)
    }
}

/// Owns the occupancy grid and every landed piece.
///
/// The landed pieces' `occupied_cells` are the source of truth; the grid is
/// rebuilt from them after each row removal.
///
/// # Example
///
/// ```
/// use cascadris_engine::{GridEngine, GridPos, Piece, PieceController, PieceId, ShapeKind, coords};
///
/// let mut engine = GridEngine::new();
/// let mut id = PieceId::FIRST;
/// for col in (0..10).step_by(2) {
///     let spawn = coords::grid_to_world(GridPos::new(col, 20));
///     let mut controller = PieceController::new(Piece::new(id, ShapeKind::O, spawn));
///     while controller.step_down(engine.grid()).is_fell() {}
///     engine.commit(controller.into_piece());
///     id = id.next();
/// }
///
/// let cascade = engine.clear_completed_rows();
/// assert_eq!(cascade.rows_cleared(), 2);
/// assert_eq!(cascade.score_delta(), 20);
/// assert!(engine.pieces().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GridEngine {
    grid: Grid,
    pieces: Vec<Piece>,
}

impl GridEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Landed pieces that still own at least one cell, oldest first.
    #[must_use]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Writes a landed piece into the grid and takes ownership of it.
    ///
    /// Cells above the visible board are not written and not recorded in
    /// the piece's `occupied_cells`.
    pub fn commit(&mut self, mut piece: Piece) -> CommitReport {
        debug_assert!(piece.status().is_landed(), "only landed pieces are committed");
        let cells = piece.covered_cells().collect::<Vec<_>>();
        let mut report = CommitReport {
            piece: piece.id(),
            cells: 0,
            clipped: 0,
            highest_row: cells.iter().map(|p| p.row).max().unwrap_or(i32::MIN),
        };
        for pos in cells {
            if pos.is_on_board() {
                self.grid.occupy(pos, piece.id());
                piece.claim_cell(pos);
                report.cells += 1;
            } else {
                report.clipped += 1;
            }
        }
        log::debug!(
            "committed piece {} with {} cells ({} clipped)",
            report.piece,
            report.cells,
            report.clipped
        );
        if !piece.occupied_cells().is_empty() {
            self.pieces.push(piece);
        }
        report
    }

    /// Fully occupied rows, highest row first.
    #[must_use]
    pub fn find_completed_rows(&self) -> Vec<usize> {
        self.grid.completed_rows().to_vec()
    }

    /// Runs the clear cascade for every currently completed row.
    pub fn clear_completed_rows(&mut self) -> ClearCascade {
        let rows = self.find_completed_rows();
        self.clear_rows(&rows)
    }

    /// Removes `rows` one at a time, highest row first.
    ///
    /// For each row, pieces owning cells in it are cut (and dropped once
    /// empty), the row leaves the grid, every cell above it moves down one
    /// row and the grid is rebuilt from the surviving pieces.
    pub fn clear_rows(&mut self, rows: &[usize]) -> ClearCascade {
        let mut rows = rows.to_vec();
        rows.sort_unstable_by(|a, b| b.cmp(a));
        rows.dedup();

        let mut cascade = ClearCascade::default();
        for row in rows {
            let step = self.clear_row(row);
            log::debug!(
                "cleared row {}: split {:?}, removed {:?}, shifted {}",
                step.row,
                step.split,
                step.removed,
                step.shifted.len()
            );
            cascade.steps.push(step);
        }
        if !cascade.is_empty() {
            log::info!(
                "cascade cleared {} rows (+{})",
                cascade.rows_cleared(),
                cascade.score_delta()
            );
        }
        cascade
    }

    fn clear_row(&mut self, row: usize) -> ClearStep {
        let mut step = ClearStep {
            row,
            ..ClearStep::default()
        };
        let grid_row = row as i32;

        for piece in &mut self.pieces {
            let cut = piece
                .occupied_cells()
                .iter()
                .copied()
                .filter(|p| p.row == grid_row)
                .collect::<Vec<_>>();
            if cut.is_empty() {
                continue;
            }
            piece.cut(&cut);
            if piece.status().is_removed() {
                step.removed.push(piece.id());
            } else {
                step.split.push(piece.id());
            }
        }
        self.pieces.retain(|piece| !piece.status().is_removed());

        self.grid.remove_row(row);
        for piece in &mut self.pieces {
            if piece.settle_above(grid_row) {
                step.shifted.push(piece.id());
            }
        }

        let rebuilt = Grid::from_pieces(&self.pieces);
        debug_assert_eq!(rebuilt, self.grid, "grid diverged from piece cells");
        self.grid = rebuilt;
        step
    }

    /// Checks that grid ownership and the pieces' cells describe the same set.
    pub fn check_ownership(&self) -> Result<(), OwnershipMismatch> {
        let from_grid = self.grid.ownership();
        let from_pieces = self
            .pieces
            .iter()
            .flat_map(|piece| piece.occupied_cells().iter().map(|&pos| (pos, piece.id())))
            .collect::<BTreeSet<_>>();
        let cells = from_grid
            .symmetric_difference(&from_pieces)
            .map(|(pos, _)| *pos)
            .collect::<BTreeSet<GridPos>>();
        if cells.is_empty() {
            Ok(())
        } else {
            Err(OwnershipMismatch {
                cells: cells.into_iter().collect(),
            })
        }
    }

    /// Total occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.grid.occupied_count()
    }

    /// Returns `true` if every column of `row` is occupied.
    #[must_use]
    pub fn is_row_complete(&self, row: usize) -> bool {
        (0..BOARD_COLS as i32).all(|col| self.grid.is_occupied(GridPos::new(col, row as i32)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        coords,
        shape::{PieceRotation, ShapeKind},
    };

    fn landed(id: u32, kind: ShapeKind, turns: u8, anchor: GridPos) -> Piece {
        let mut piece = Piece::new(PieceId::new(id), kind, coords::grid_to_world(anchor));
        let rotation = PieceRotation::new(turns);
        piece.set_rotation(rotation, kind.matrix(rotation));
        piece.land();
        piece
    }

    /// Fills `row` except `gaps` with single-cell-wide vertical I pieces
    /// sitting with their top cell in `row`.
    fn bars_topping_at(engine: &mut GridEngine, first_id: u32, row: i32, gaps: &[i32]) {
        let mut id = first_id;
        for col in (0..10).filter(|c| !gaps.contains(c)) {
            engine.commit(landed(id, ShapeKind::I, 0, GridPos::new(col, row - 4)));
            id += 1;
        }
    }

    #[test]
    fn test_commit_writes_owned_cells() {
        let mut engine = GridEngine::new();
        let report = engine.commit(landed(1, ShapeKind::T, 0, GridPos::new(2, -1)));
        assert_eq!(report.cells, 4);
        assert_eq!(report.clipped, 0);
        assert_eq!(report.highest_row, 1);
        assert_eq!(engine.occupied_count(), 4);
        assert_eq!(
            engine.grid().cell(GridPos::new(3, 0)).and_then(|c| c.owner()),
            Some(PieceId::new(1))
        );
        engine.check_ownership().unwrap();
    }

    #[test]
    fn test_commit_clips_cells_above_board() {
        let mut engine = GridEngine::new();
        let report = engine.commit(landed(1, ShapeKind::I, 0, GridPos::new(0, 17)));
        assert_eq!(report.cells, 2);
        assert_eq!(report.clipped, 2);
        assert_eq!(report.highest_row, 21);
        assert_eq!(engine.pieces()[0].occupied_cells().len(), 2);
        engine.check_ownership().unwrap();
    }

    #[test]
    fn test_single_row_clear() {
        let mut engine = GridEngine::new();
        bars_topping_at(&mut engine, 1, 3, &[]);
        assert_eq!(engine.find_completed_rows(), vec![3, 2, 1, 0]);

        let before = engine.occupied_count();
        let cascade = engine.clear_rows(&[0]);
        assert_eq!(cascade.rows_cleared(), 1);
        assert_eq!(cascade.score_delta(), 10);
        assert_eq!(engine.occupied_count(), before - 10);
        assert_eq!(cascade.steps()[0].split.len(), 10);
        assert_eq!(cascade.steps()[0].shifted.len(), 10);
        engine.check_ownership().unwrap();
    }

    #[test]
    fn test_multi_row_cascade_scores_once() {
        let mut engine = GridEngine::new();
        bars_topping_at(&mut engine, 1, 3, &[]);
        let cascade = engine.clear_completed_rows();
        assert_eq!(cascade.rows_cleared(), 4);
        assert_eq!(cascade.score_delta(), 40);
        let rows = cascade.steps().iter().map(|s| s.row).collect::<Vec<_>>();
        assert_eq!(rows, vec![3, 2, 1, 0]);
        assert_eq!(cascade.steps()[3].removed.len(), 10);
        assert!(engine.pieces().is_empty());
        assert_eq!(engine.occupied_count(), 0);
    }

    #[test]
    fn test_partial_clear_splits_and_shifts() {
        let mut engine = GridEngine::new();
        // row 0 filled by an O and two flat bars
        engine.commit(landed(1, ShapeKind::O, 0, GridPos::new(0, -1)));
        engine.commit(landed(2, ShapeKind::I, 1, GridPos::new(2, -1)));
        engine.commit(landed(3, ShapeKind::I, 1, GridPos::new(6, -1)));
        // a T resting on the flat bars
        engine.commit(landed(4, ShapeKind::T, 0, GridPos::new(3, 0)));
        assert_eq!(engine.find_completed_rows(), vec![0]);

        let cascade = engine.clear_completed_rows();
        let step = &cascade.steps()[0];
        assert_eq!(step.split, vec![PieceId::new(1)]);
        assert_eq!(step.removed, vec![PieceId::new(2), PieceId::new(3)]);
        assert_eq!(step.shifted, vec![PieceId::new(1), PieceId::new(4)]);

        let o = &engine.pieces()[0];
        assert!(o.is_custom());
        assert_eq!(o.matrix().to_string(), "##");
        assert_eq!(
            o.occupied_cells().iter().copied().collect::<Vec<_>>(),
            vec![GridPos::new(0, 0), GridPos::new(1, 0)]
        );
        let t = &engine.pieces()[1];
        assert!(!t.is_custom());
        assert_eq!(t.anchor(), GridPos::new(3, -1));
        assert_eq!(engine.occupied_count(), 6);
        engine.check_ownership().unwrap();
    }

    #[test]
    fn test_straddling_piece_keeps_lower_cells() {
        let mut engine = GridEngine::new();
        // vertical I at column 9 over rows 0..=3
        engine.commit(landed(1, ShapeKind::I, 0, GridPos::new(9, -1)));
        // row 1 completed by two flat bars and a second vertical bar
        engine.commit(landed(2, ShapeKind::I, 1, GridPos::new(0, 0)));
        engine.commit(landed(3, ShapeKind::I, 1, GridPos::new(4, 0)));
        engine.commit(landed(4, ShapeKind::I, 0, GridPos::new(8, -1)));
        assert_eq!(engine.find_completed_rows(), vec![1]);

        let cascade = engine.clear_completed_rows();
        assert_eq!(cascade.steps()[0].removed, vec![PieceId::new(2), PieceId::new(3)]);
        assert_eq!(engine.pieces().len(), 2);
        let bar = &engine.pieces()[0];
        assert_eq!(bar.id(), PieceId::new(1));
        assert_eq!(bar.matrix().to_string(), "#\n#\n#");
        assert_eq!(
            bar.occupied_cells().iter().map(|p| p.row).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        engine.check_ownership().unwrap();
    }

    #[test]
    fn test_clear_rows_ignores_input_order() {
        let mut a = GridEngine::new();
        let mut b = GridEngine::new();
        bars_topping_at(&mut a, 1, 3, &[]);
        bars_topping_at(&mut b, 1, 3, &[]);
        let ca = a.clear_rows(&[0, 2]);
        let cb = b.clear_rows(&[2, 0, 2]);
        assert_eq!(ca, cb);
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.occupied_count(), 20);
    }

    #[test]
    fn test_no_completed_rows_is_noop() {
        let mut engine = GridEngine::new();
        bars_topping_at(&mut engine, 1, 3, &[4]);
        let grid = engine.grid().clone();
        let cascade = engine.clear_completed_rows();
        assert!(cascade.is_empty());
        assert_eq!(cascade.score_delta(), 0);
        assert_eq!(engine.grid(), &grid);
        assert!(!engine.is_row_complete(0));
    }

    #[test]
    fn test_check_ownership_reports_mismatch() {
        let mut engine = GridEngine::new();
        engine.commit(landed(1, ShapeKind::O, 0, GridPos::new(0, -1)));
        engine.grid.occupy(GridPos::new(5, 5), PieceId::new(9));
        let err = engine.check_ownership().unwrap_err();
        assert_eq!(err.cells, vec![GridPos::new(5, 5)]);
    }
}
