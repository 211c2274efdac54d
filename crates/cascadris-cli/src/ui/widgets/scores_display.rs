use cascadris_engine::RankedScore;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    text::Line,
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::ui::widgets::style;

/// Shown rows of the high-score table.
const MAX_ROWS: usize = 10;
const NAME_WIDTH: usize = 12;

/// The high-score table, highlighting entries by the current player.
pub struct ScoresDisplay<'a> {
    scores: &'a [RankedScore],
    player_name: &'a str,
    block: Option<BlockWidget<'a>>,
}

impl<'a> ScoresDisplay<'a> {
    pub fn new(scores: &'a [RankedScore], player_name: &'a str) -> Self {
        Self {
            scores,
            player_name,
            block: None,
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
        (NAME_WIDTH + 12) as u16 + super::block_horizontal_margin(self.block.as_ref())
    }

    #[expect(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u16 {
        MAX_ROWS as u16 + super::block_vertical_margin(self.block.as_ref())
    }
}

fn truncate_name(name: &str) -> String {
    if name.chars().count() <= NAME_WIDTH {
        return name.to_owned();
    }
    let mut short = name.chars().take(NAME_WIDTH - 1).collect::<String>();
    short.push('~');
    short
}

impl Widget for ScoresDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        if self.scores.is_empty() {
            Line::styled("no scores", style::EMPTY_DOT)
                .centered()
                .render(area, buf);
            return;
        }

        let rows_areas =
            Layout::vertical((0..MAX_ROWS).map(|_| Constraint::Length(1))).split(area);
        for (entry, area) in self.scores.iter().take(MAX_ROWS).zip(rows_areas.iter()) {
            let style = if entry.name == self.player_name {
                style::HIGHLIGHT
            } else {
                style::DEFAULT
            };
            let [rank_area, name_area, score_area] = area.layout(&Layout::horizontal([
                Constraint::Length(3),
                Constraint::Fill(1),
                Constraint::Length(6),
            ]));
            Line::styled(format!("{:>2}", entry.rank), style).render(rank_area, buf);
            Line::styled(truncate_name(&entry.name), style).render(name_area, buf);
            Line::styled(entry.score.to_string(), style)
                .right_aligned()
                .render(score_area, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("ann"), "ann");
        assert_eq!(truncate_name("abcdefghijklmnop"), "abcdefghijk~");
        assert_eq!(truncate_name("abcdefghijkl"), "abcdefghijkl");
    }
}
