use cascadris_engine::{GameSession, RankedScore, SessionState};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::ui::widgets::{BoardDisplay, ScoresDisplay, StatsDisplay, color, style};

/// Stats, board and high scores side by side, with a popup for the current state.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    session: &'a GameSession,
    scores: &'a [RankedScore],
    show_preview: bool,
    horizontal_padding: u16,
    vertical_padding: u16,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(session: &'a GameSession, scores: &'a [RankedScore]) -> Self {
        Self {
            session,
            scores,
            show_preview: true,
            horizontal_padding: 1,
            vertical_padding: 0,
        }
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.session.state();
        let block_padding = Padding::symmetric(self.horizontal_padding, self.vertical_padding);
        let border_style = match state {
            SessionState::Start => color::GREEN,
            SessionState::Playing => color::WHITE,
            SessionState::Paused => color::YELLOW,
            SessionState::GameOver => color::RED,
        };
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(style::DEFAULT)
        };

        let board = BoardDisplay::new(self.session)
            .preview(self.show_preview && state.is_playing())
            .block(
                Block::bordered()
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );
        let stats = StatsDisplay::new(self.session).block(panel("STATS"));
        let scores = ScoresDisplay::new(self.scores, &self.session.config().player_name)
            .block(panel("HIGH SCORES"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(stats.width()),
            Constraint::Length(board.width()),
            Constraint::Length(scores.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [stats_area] = Layout::vertical([Constraint::Length(stats.height())]).areas(left_column);
        let [board_area] = Layout::vertical([Constraint::Length(board.height())]).areas(center_column);
        let [scores_area] =
            Layout::vertical([Constraint::Length(scores.height())]).areas(right_column);

        let board_width = board.width();
        stats.render(stats_area, buf);
        board.render(board_area, buf);
        scores.render(scores_area, buf);

        let popup = match state {
            SessionState::Playing => None,
            SessionState::Start => Some((
                "PRESS ENTER",
                Style::new().fg(color::BLACK).bg(color::GREEN),
            )),
            SessionState::Paused => {
                Some(("PAUSED", Style::new().fg(color::BLACK).bg(color::YELLOW)))
            }
            SessionState::GameOver => {
                Some(("GAME OVER!!", Style::new().fg(color::WHITE).bg(color::RED)))
            }
        };

        if let Some((text, style)) = popup {
            let block = Block::new().style(style);
            let text = Text::styled(text, style).centered();
            let area = board_area.centered(Constraint::Length(board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
