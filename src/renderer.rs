use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Block;
use ratatui::Frame;

use crate::config::{GridSize, CELL_WIDTH};
use crate::game::{GameSnapshot, GameStatus};
use crate::snake::Position;
use crate::ui::hud::{render_hud, HudInfo};
use crate::ui::menu::{render_game_over_menu, render_notices, render_pause_menu, render_start_menu};
use crate::ui::notice::NoticeBoard;

const CELL_GLYPH: &str = "██";
const FOOD_GLYPH: &str = "◆ ";

/// Renders one full frame from an immutable snapshot.
pub fn render(
    frame: &mut Frame<'_>,
    snapshot: &GameSnapshot,
    bounds: GridSize,
    info: &HudInfo,
    notices: &mut NoticeBoard,
    now: Instant,
) {
    let area = frame.area();
    let play_area = render_hud(frame, area, snapshot, info);

    let block = Block::bordered().border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(play_area);
    frame.render_widget(block, play_area);

    render_food(frame, inner, bounds, snapshot);
    render_snake(frame, inner, bounds, snapshot);

    match snapshot.status {
        GameStatus::Idle => render_start_menu(frame, play_area, info.high_score),
        GameStatus::Paused => render_pause_menu(frame, play_area),
        GameStatus::GameOver | GameStatus::Victory => {
            render_game_over_menu(frame, play_area, snapshot, info.high_score);
        }
        GameStatus::Playing => {}
    }

    render_notices(frame, play_area, notices, now);
}

fn render_food(frame: &mut Frame<'_>, inner: Rect, bounds: GridSize, snapshot: &GameSnapshot) {
    let Some(food) = snapshot.food else {
        return;
    };
    let Some((x, y)) = cell_to_terminal(inner, bounds, food) else {
        return;
    };

    frame
        .buffer_mut()
        .set_string(x, y, FOOD_GLYPH, Style::default().fg(Color::Magenta));
}

fn render_snake(frame: &mut Frame<'_>, inner: Rect, bounds: GridSize, snapshot: &GameSnapshot) {
    let body_color = if snapshot.boost {
        Color::LightCyan
    } else {
        Color::Cyan
    };

    let buffer = frame.buffer_mut();
    for (i, segment) in snapshot.snake.iter().enumerate() {
        let Some((x, y)) = cell_to_terminal(inner, bounds, *segment) else {
            continue;
        };

        let style = if i == 0 {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(body_color)
        };
        buffer.set_string(x, y, CELL_GLYPH, style);
    }
}

fn cell_to_terminal(inner: Rect, bounds: GridSize, position: Position) -> Option<(u16, u16)> {
    if !position.is_within_bounds(bounds) {
        return None;
    }

    let x_offset = u16::try_from(position.x).ok()?.checked_mul(CELL_WIDTH)?;
    let y_offset = u16::try_from(position.y).ok()?;

    let x = inner.x.saturating_add(x_offset);
    let y = inner.y.saturating_add(y_offset);
    let x_end = x.checked_add(CELL_WIDTH)?;
    if x_end > inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}
