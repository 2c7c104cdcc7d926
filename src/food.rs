use rand::Rng;

use crate::config::GridSize;
use crate::snake::{Position, Snake};

/// Picks a uniformly random free cell for food, or `None` when the snake
/// covers the whole board.
///
/// Enumerating free cells instead of rejection-sampling keeps the spawn
/// bounded even on an almost-full board; the `None` case is the caller's
/// board-full terminal condition.
#[must_use]
pub fn spawn_position<R: Rng + ?Sized>(
    rng: &mut R,
    bounds: GridSize,
    snake: &Snake,
) -> Option<Position> {
    let mut candidates = Vec::with_capacity(bounds.total_cells().saturating_sub(snake.len()));

    for y in 0..i32::from(bounds.height) {
        for x in 0..i32::from(bounds.width) {
            let position = Position { x, y };
            if !snake.occupies(position) {
                candidates.push(position);
            }
        }
    }

    if candidates.is_empty() {
        return None;
    }

    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index])
}
