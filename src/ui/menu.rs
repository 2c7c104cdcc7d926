use std::time::Instant;

use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph};
use ratatui::Frame;

use crate::game::{EndReason, GameSnapshot, GameStatus};
use crate::ui::notice::{NoticeBoard, NoticeKind};

/// Draws the start screen as a centered popup.
pub fn render_start_menu(frame: &mut Frame<'_>, area: Rect, high_score: u32) {
    let popup = centered_popup(area, 70, 45);
    frame.render_widget(Clear, popup);

    let [title_row, body_row] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(3)]).areas(popup);

    frame.render_widget(
        Paragraph::new(Line::from("NEON SNAKE"))
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
        title_row,
    );

    let body = vec![
        Line::from(format!("Best score: {high_score}")),
        Line::from(""),
        Line::from("[Enter] Start   [L] Load saved game"),
        Line::from("[Q] Quit"),
    ];
    frame.render_widget(
        Paragraph::new(body)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" start ")),
        body_row,
    );
}

/// Draws the pause screen as a centered popup.
pub fn render_pause_menu(frame: &mut Frame<'_>, area: Rect) {
    let popup = centered_popup(area, 60, 30);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from("PAUSED"),
        Line::from(""),
        Line::from("[P] Resume   [S] Save   [E] Export"),
        Line::from("[Q] Save and quit"),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" pause ")),
        popup,
    );
}

/// Draws the game-over / victory screen as a centered popup.
pub fn render_game_over_menu(
    frame: &mut Frame<'_>,
    area: Rect,
    snapshot: &GameSnapshot,
    high_score: u32,
) {
    let popup = centered_popup(area, 70, 45);
    frame.render_widget(Clear, popup);

    let (title, color) = match snapshot.status {
        GameStatus::Victory => ("BOARD CLEARED", Color::Green),
        _ => ("GAME OVER", Color::Red),
    };
    let reason = end_reason_text(snapshot.end_reason);

    let lines = vec![
        Line::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::from(format!("Score {}   Best {}", snapshot.score, high_score)),
        Line::from(format!(
            "Length {}   Food {}   Boosts {}   {}s",
            snapshot.snake.len(),
            snapshot.food_eaten,
            snapshot.boost_activations,
            snapshot.elapsed.as_secs(),
        )),
        Line::from(reason.to_owned()),
        Line::from(""),
        Line::from("[Enter] Play again   [L] Load   [Q] Quit"),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" game over ")),
        popup,
    );
}

/// Draws active notices bottom-centered over the play area.
pub fn render_notices(frame: &mut Frame<'_>, area: Rect, board: &mut NoticeBoard, now: Instant) {
    let notices: Vec<_> = board.active(now).cloned().collect();
    if notices.is_empty() {
        return;
    }

    let height = notices.len() as u16;
    let strip = Rect {
        x: area.x,
        y: area.bottom().saturating_sub(height + 1),
        width: area.width,
        height,
    };
    frame.render_widget(Clear, strip);

    let lines: Vec<Line<'_>> = notices
        .iter()
        .map(|notice| {
            let color = match notice.kind {
                NoticeKind::Info => Color::Cyan,
                NoticeKind::Warning => Color::Magenta,
            };
            Line::styled(notice.message.clone(), Style::default().fg(color))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), strip);
}

fn end_reason_text(reason: Option<EndReason>) -> &'static str {
    match reason {
        Some(EndReason::WallCollision) => "the snake hit the wall",
        Some(EndReason::SelfCollision) => "the snake ate itself",
        Some(EndReason::BoardFull) => "the snake filled the board",
        Some(EndReason::Quit) => "session ended",
        None => "",
    }
}

fn centered_popup(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, vertical, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);

    let [_, popup, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(vertical);

    popup
}
