use std::{collections::HashMap, iter};

use cascadris_engine::{BOARD_COLS, BOARD_ROWS, GameSession, GridPos, coords};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::{CellContent, CellDisplay};

type Cells = [[CellContent; BOARD_COLS]; BOARD_ROWS];

/// The visible board: landed cells, the falling piece and its landing preview.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    session: &'a GameSession,
    show_preview: bool,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(session: &'a GameSession) -> Self {
        Self {
            session,
            show_preview: false,
            block: None,
        }
    }

    pub fn preview(self, show_preview: bool) -> Self {
        Self {
            show_preview,
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn width(&self) -> u16 {
        BOARD_COLS as u16 * CellDisplay::width()
            + super::block_horizontal_margin(self.block.as_ref())
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u16 {
        BOARD_ROWS as u16 * CellDisplay::height()
            + super::block_vertical_margin(self.block.as_ref())
    }

    fn cells(&self) -> Cells {
        let mut cells = [[CellContent::Empty; BOARD_COLS]; BOARD_ROWS];

        let kinds = self
            .session
            .engine()
            .pieces()
            .iter()
            .map(|piece| (piece.id(), piece.kind()))
            .collect::<HashMap<_, _>>();
        for (pos, owner) in self.session.grid().occupied_cells() {
            if let Some(&kind) = kinds.get(&owner) {
                set_cell(&mut cells, pos, CellContent::Piece(kind));
            }
        }

        if self.show_preview
            && let Some(view) = self.session.drop_preview()
        {
            let anchor = coords::world_to_grid(view.position);
            for (_, _, pos) in coords::matrix_cells(&view.matrix, anchor) {
                set_cell(&mut cells, pos, CellContent::Preview);
            }
        }

        if let Some(piece) = self.session.active_piece() {
            for pos in piece.covered_cells() {
                set_cell(&mut cells, pos, CellContent::Piece(piece.kind()));
            }
        }
        cells
    }
}

fn set_cell(cells: &mut Cells, pos: GridPos, content: CellContent) {
    if let (Ok(row), Ok(col)) = (usize::try_from(pos.row), usize::try_from(pos.col))
        && row < BOARD_ROWS
        && col < BOARD_COLS
    {
        cells[row][col] = content;
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints = (0..BOARD_COLS).map(|_| Constraint::Length(CellDisplay::width()));
        let row_constraints = (0..BOARD_ROWS).map(|_| Constraint::Length(CellDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let screen_cells = area
            .layout::<BOARD_ROWS>(&vertical)
            .into_iter()
            .map(|row| row.layout::<BOARD_COLS>(&horizontal));

        // row 0 is the floor, the screen is drawn top down
        let cells = self.cells();
        for (screen_row, row) in iter::zip(screen_cells, cells.iter().rev()) {
            for (screen_cell, content) in iter::zip(screen_row, row) {
                CellDisplay::from_content(*content).render(screen_cell, buf);
            }
        }
    }
}
