use cascadris_engine::ShapeKind;
use ratatui::{
    prelude::{Buffer, Rect},
    style::Style,
    widgets::{Paragraph, Widget},
};

use crate::ui::widgets::style;

/// What one board cell shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CellContent {
    #[default]
    Empty,
    /// Where the falling piece would land.
    Preview,
    Piece(ShapeKind),
}

#[derive(Debug)]
pub struct CellDisplay {
    style: Style,
    symbol: &'static str,
}

impl CellDisplay {
    pub const fn width() -> u16 {
        2
    }

    pub const fn height() -> u16 {
        1
    }

    pub const fn from_content(content: CellContent) -> Self {
        let (style, symbol) = match content {
            CellContent::Empty => (style::EMPTY_DOT, "."),
            CellContent::Preview => (style::PREVIEW, "[]"),
            CellContent::Piece(kind) => (style::piece(kind), ""),
        };
        Self { style, symbol }
    }
}

impl Widget for CellDisplay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // fill the whole area, not just the cells under the symbol
        Paragraph::new(self.symbol)
            .style(self.style)
            .centered()
            .render(area, buf);
    }
}
