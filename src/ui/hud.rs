use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::game::GameSnapshot;

/// Supplemental values displayed by the HUD rows.
#[derive(Debug, Clone)]
pub struct HudInfo {
    pub high_score: u32,
    pub username: String,
    /// "online", "offline", or "local" depending on the persistence backend.
    pub sync_label: &'static str,
}

/// Renders the two-line HUD below the play area and returns the play area.
#[must_use]
pub fn render_hud(frame: &mut Frame<'_>, area: Rect, snapshot: &GameSnapshot, info: &HudInfo) -> Rect {
    let [play_area, score_row, status_row] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let mut score_line = vec![
        Span::styled(
            format!(" score {:<6}", snapshot.score),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("best {:<6}", info.high_score),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("length {:<4}", snapshot.snake.len()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if snapshot.boost {
        score_line.push(Span::styled(
            "BOOST",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(score_line)), score_row);

    frame.render_widget(
        Paragraph::new(Line::from(format!(
            " {} · {} · [p]ause [space]boost [s]ave [l]oad [e]xport [q]uit",
            info.username, info.sync_label
        )))
        .alignment(Alignment::Left)
        .style(Style::default().fg(Color::DarkGray)),
        status_row,
    );

    play_area
}
