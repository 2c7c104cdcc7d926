use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::GridSize;
use crate::input::Direction;

/// Grid position in logical cell coordinates.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Returns true when the position lies inside the bounds.
    #[must_use]
    pub fn is_within_bounds(self, bounds: GridSize) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.x < i32::from(bounds.width)
            && self.y < i32::from(bounds.height)
    }

    /// Returns the neighboring position one step in `direction`.
    #[must_use]
    pub fn stepped(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Mutable snake state and the single-slot direction buffer.
///
/// At most one direction change is pending between ticks; later inputs
/// overwrite it (last write before the tick wins), and inputs that would
/// reverse the committed heading are dropped.
#[derive(Debug, Clone)]
pub struct Snake {
    body: VecDeque<Position>,
    direction: Direction,
    pending_direction: Direction,
}

impl Snake {
    /// Creates a horizontal snake of `length` cells, head at `head`,
    /// body extending opposite to `direction`.
    #[must_use]
    pub fn with_length(head: Position, direction: Direction, length: usize) -> Self {
        let (dx, dy) = direction.delta();
        let body = (0..length.max(1) as i32)
            .map(|i| Position {
                x: head.x - dx * i,
                y: head.y - dy * i,
            })
            .collect();

        Self {
            body,
            direction,
            pending_direction: direction,
        }
    }

    /// Creates a snake from explicit body segments (front is head).
    #[must_use]
    pub fn from_segments(segments: Vec<Position>, direction: Direction) -> Self {
        Self {
            body: VecDeque::from(segments),
            direction,
            pending_direction: direction,
        }
    }

    /// Buffers a direction change for the next tick.
    ///
    /// Reversals of the *committed* direction are ignored so the head can
    /// never fold back onto the neck within one tick.
    pub fn buffer_direction(&mut self, direction: Direction) {
        if !crate::input::direction_change_is_valid(self.direction, direction) {
            return;
        }
        self.pending_direction = direction;
    }

    /// Commits the buffered direction at a tick boundary.
    pub fn commit_direction(&mut self) {
        self.direction = self.pending_direction;
    }

    /// Returns the head position one step ahead along the committed direction.
    #[must_use]
    pub fn next_head_position(&self) -> Position {
        self.head().stepped(self.direction)
    }

    /// Prepends `head` and, unless growing, drops the tail cell.
    pub fn advance(&mut self, head: Position, grow: bool) {
        self.body.push_front(head);
        if !grow {
            let _ = self.body.pop_back();
        }
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Position {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Returns true if any segment occupies `position`.
    #[must_use]
    pub fn occupies(&self, position: Position) -> bool {
        self.body.contains(&position)
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Returns true when there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Returns the committed movement direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Returns the direction that will be committed on the next tick.
    #[must_use]
    pub fn pending_direction(&self) -> Direction {
        self.pending_direction
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }
}
