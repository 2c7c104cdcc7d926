use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::api::types::GameStateRecord;
use crate::config::{
    GridSize, BOOST_BONUS_POINTS, BOOST_TICK_MS, FOOD_POINTS, NORMAL_TICK_MS, START_LENGTH,
};
use crate::food;
use crate::input::{Direction, GameInput};
use crate::score::HighScore;
use crate::snake::{Position, Snake};

/// Current high-level gameplay state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum GameStatus {
    /// Constructed but never started.
    Idle,
    Playing,
    Paused,
    GameOver,
    /// The snake covers every cell; the board-full terminal condition.
    Victory,
}

impl GameStatus {
    /// Returns true for episode-terminal states.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Victory)
    }
}

/// Why an episode ended, in the remote store's vocabulary.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EndReason {
    WallCollision,
    SelfCollision,
    Quit,
    BoardFull,
}

impl EndReason {
    /// Wire string recorded with a game session.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WallCollision => "wall_collision",
            Self::SelfCollision => "self_collision",
            Self::Quit => "quit",
            Self::BoardFull => "board_full",
        }
    }
}

/// Returns true when the grid can hold the centered starting snake with
/// its tail in bounds.
///
/// The binary refuses to start on grids that fail this; library callers
/// should check it before constructing a [`GameState`].
#[must_use]
pub fn grid_fits_start(bounds: GridSize) -> bool {
    bounds.height >= 1 && i32::from(bounds.width / 2) >= START_LENGTH as i32 - 1
}

/// Validation failures when restoring a saved game.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum RestoreError {
    #[error("saved game has no snake segments")]
    EmptySnake,
    #[error("saved snake leaves the {0}×{1} grid")]
    OutOfBounds(u16, u16),
    #[error("saved snake overlaps itself")]
    OverlappingSnake,
    #[error("saved direction is not a unit vector")]
    InvalidDirection,
}

/// Read-only copy of episode state handed to rendering and persistence.
#[derive(Debug, Clone)]
pub struct GameSnapshot {
    pub snake: Vec<Position>,
    pub food: Option<Position>,
    pub direction: Direction,
    pub score: u32,
    pub speed_ms: u64,
    pub status: GameStatus,
    pub boost: bool,
    pub food_eaten: u32,
    pub boost_activations: u32,
    pub end_reason: Option<EndReason>,
    pub episode: u64,
    pub elapsed: Duration,
}

/// Complete mutable game state for one episode.
///
/// Owned exclusively by the caller driving `tick()`; everything else reads
/// through [`GameState::snapshot`].
#[derive(Debug, Clone)]
pub struct GameState {
    pub snake: Snake,
    pub food: Option<Position>,
    pub score: u32,
    pub speed_ms: u64,
    pub status: GameStatus,
    pub boost: bool,
    pub food_eaten: u32,
    pub boost_activations: u32,
    pub end_reason: Option<EndReason>,
    pub high_score: HighScore,
    /// Monotonic episode number; bumped by `reset`/`restore` so completions
    /// of persistence calls from an older episode can be recognized and
    /// discarded.
    episode: u64,
    started_at: Instant,
    bounds: GridSize,
    rng: StdRng,
}

impl GameState {
    /// Creates an idle state; call [`GameState::reset`] to start playing.
    #[must_use]
    pub fn new(bounds: GridSize) -> Self {
        Self::new_with_seed(bounds, rand::random())
    }

    /// Creates a deterministic state for tests and reproducible simulations.
    #[must_use]
    pub fn new_with_seed(bounds: GridSize, seed: u64) -> Self {
        let center = Position {
            x: i32::from(bounds.width / 2),
            y: i32::from(bounds.height / 2),
        };

        Self {
            snake: Snake::with_length(center, Direction::Right, START_LENGTH),
            food: None,
            score: 0,
            speed_ms: NORMAL_TICK_MS,
            status: GameStatus::Idle,
            boost: false,
            food_eaten: 0,
            boost_activations: 0,
            end_reason: None,
            high_score: HighScore::default(),
            episode: 0,
            started_at: Instant::now(),
            bounds,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Starts a fresh episode: centered three-cell snake heading right,
    /// score zero, normal speed, food spawned off-snake.
    ///
    /// A board the starting snake already fills has nowhere to put food and
    /// ends immediately as a board-full win instead of entering play.
    pub fn reset(&mut self) {
        let center = Position {
            x: i32::from(self.bounds.width / 2),
            y: i32::from(self.bounds.height / 2),
        };

        self.snake = Snake::with_length(center, Direction::Right, START_LENGTH);
        self.food = food::spawn_position(&mut self.rng, self.bounds, &self.snake);
        self.score = 0;
        self.speed_ms = NORMAL_TICK_MS;
        self.boost = false;
        self.food_eaten = 0;
        self.boost_activations = 0;
        self.episode += 1;
        self.started_at = Instant::now();
        if self.food.is_none() {
            self.status = GameStatus::Victory;
            self.end_reason = Some(EndReason::BoardFull);
        } else {
            self.status = GameStatus::Playing;
            self.end_reason = None;
        }
    }

    /// Buffers a direction change; reversals of the committed heading are
    /// dropped, later calls before the next tick overwrite earlier ones.
    pub fn set_intended_direction(&mut self, direction: Direction) {
        if matches!(self.status, GameStatus::Playing | GameStatus::Paused) {
            self.snake.buffer_direction(direction);
        }
    }

    /// Applies the level-triggered boost signal.
    ///
    /// Idempotent: the activation counter moves only on the inactive→active
    /// edge. Activation requires an unpaused running game; deactivation
    /// always applies.
    pub fn set_boost(&mut self, active: bool) {
        if active {
            if self.status != GameStatus::Playing {
                return;
            }
            if !self.boost {
                self.boost_activations += 1;
            }
            self.boost = true;
            self.speed_ms = BOOST_TICK_MS;
        } else {
            self.boost = false;
            self.speed_ms = NORMAL_TICK_MS;
        }
    }

    /// Flips between Playing and Paused; no-op in any other state.
    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            GameStatus::Playing => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Playing,
            other => other,
        };
    }

    /// Ends the current episode explicitly (save-and-quit path).
    pub fn end_episode(&mut self, reason: EndReason) {
        if self.status == GameStatus::Idle || self.status.is_terminal() {
            return;
        }
        self.status = GameStatus::GameOver;
        self.end_reason = Some(reason);
    }

    /// Advances the simulation by one step.
    ///
    /// Collisions are detected on the candidate head before the body
    /// mutates, so a terminal state never contains an overlapping snake.
    pub fn tick(&mut self) {
        if self.status != GameStatus::Playing {
            return;
        }

        self.snake.commit_direction();
        let next_head = self.snake.next_head_position();

        if !next_head.is_within_bounds(self.bounds) {
            self.status = GameStatus::GameOver;
            self.end_reason = Some(EndReason::WallCollision);
            return;
        }
        if self.snake.occupies(next_head) {
            self.status = GameStatus::GameOver;
            self.end_reason = Some(EndReason::SelfCollision);
            return;
        }

        let ate = self.food == Some(next_head);
        self.snake.advance(next_head, ate);

        if ate {
            self.score += FOOD_POINTS;
            if self.boost {
                self.score += BOOST_BONUS_POINTS;
            }
            self.food_eaten += 1;
            self.high_score.observe(self.score);

            self.food = food::spawn_position(&mut self.rng, self.bounds, &self.snake);
            if self.food.is_none() {
                self.status = GameStatus::Victory;
                self.end_reason = Some(EndReason::BoardFull);
            }
        }
    }

    /// Applies one external input event.
    pub fn apply_input(&mut self, input: GameInput) {
        match input {
            GameInput::Direction(direction) => self.set_intended_direction(direction),
            GameInput::Boost(active) => self.set_boost(active),
            GameInput::Pause => self.toggle_pause(),
            _ => {}
        }
    }

    /// Returns a read-only copy of the episode state.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            snake: self.snake.segments().copied().collect(),
            food: self.food,
            direction: self.snake.direction(),
            score: self.score,
            speed_ms: self.speed_ms,
            status: self.status,
            boost: self.boost,
            food_eaten: self.food_eaten,
            boost_activations: self.boost_activations,
            end_reason: self.end_reason,
            episode: self.episode,
            elapsed: self.started_at.elapsed(),
        }
    }

    /// Replaces the episode with a saved game, validating the record first.
    ///
    /// A successful restore is a new episode: in-flight persistence
    /// completions for the previous one become stale.
    pub fn restore(&mut self, record: &GameStateRecord) -> Result<(), RestoreError> {
        if record.snake_positions.is_empty() {
            return Err(RestoreError::EmptySnake);
        }
        if record
            .snake_positions
            .iter()
            .any(|cell| !cell.is_within_bounds(self.bounds))
        {
            return Err(RestoreError::OutOfBounds(
                self.bounds.width,
                self.bounds.height,
            ));
        }
        for (i, cell) in record.snake_positions.iter().enumerate() {
            if record.snake_positions[..i].contains(cell) {
                return Err(RestoreError::OverlappingSnake);
            }
        }
        let direction = Direction::from_delta(record.direction.x, record.direction.y)
            .ok_or(RestoreError::InvalidDirection)?;

        self.snake = Snake::from_segments(record.snake_positions.clone(), direction);
        self.food = record
            .food_position
            .filter(|cell| !self.snake.occupies(*cell) && cell.is_within_bounds(self.bounds));
        if self.food.is_none() {
            self.food = food::spawn_position(&mut self.rng, self.bounds, &self.snake);
        }
        self.score = record.score;
        self.speed_ms = if record.game_speed > 0 {
            record.game_speed
        } else {
            NORMAL_TICK_MS
        };
        self.boost = false;
        self.food_eaten = 0;
        self.boost_activations = 0;
        if self.food.is_none() {
            // The saved snake covers every cell; nothing is left to play.
            self.status = GameStatus::Victory;
            self.end_reason = Some(EndReason::BoardFull);
        } else {
            self.status = GameStatus::Playing;
            self.end_reason = None;
        }
        self.high_score.observe(self.score);
        self.episode += 1;
        self.started_at = Instant::now();
        Ok(())
    }

    /// Returns the grid bounds this episode plays on.
    #[must_use]
    pub fn bounds(&self) -> GridSize {
        self.bounds
    }

    /// Returns the current episode number.
    #[must_use]
    pub fn episode(&self) -> u64 {
        self.episode
    }

    /// Returns true when the game sits on the start screen.
    #[must_use]
    pub fn is_start_screen(&self) -> bool {
        self.status == GameStatus::Idle
    }
}

#[cfg(test)]
mod tests {
    use crate::api::types::GameStateRecord;
    use crate::config::{GridSize, BOOST_TICK_MS, NORMAL_TICK_MS};
    use crate::input::Direction;
    use crate::snake::{Position, Snake};

    use super::{grid_fits_start, EndReason, GameState, GameStatus};

    fn playing_state(width: u16, height: u16, seed: u64) -> GameState {
        let mut state = GameState::new_with_seed(GridSize { width, height }, seed);
        state.reset();
        state
    }

    #[test]
    fn reset_starts_centered_three_cell_snake_heading_right() {
        let state = playing_state(20, 20, 1);

        assert_eq!(state.status, GameStatus::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.speed_ms, NORMAL_TICK_MS);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.snake.head(), Position { x: 10, y: 10 });
        assert_eq!(state.snake.direction(), Direction::Right);
        let food = state.food.expect("fresh episode has food");
        assert!(!state.snake.occupies(food));
    }

    #[test]
    fn eating_food_grows_scores_and_respawns_off_snake() {
        let mut state = playing_state(10, 10, 4);
        state.snake = Snake::from_segments(
            vec![
                Position { x: 5, y: 5 },
                Position { x: 4, y: 5 },
                Position { x: 3, y: 5 },
            ],
            Direction::Right,
        );
        state.food = Some(Position { x: 6, y: 5 });

        state.tick();

        assert_eq!(state.score, 10);
        assert_eq!(state.food_eaten, 1);
        assert_eq!(state.snake.len(), 4);
        assert_eq!(state.snake.head(), Position { x: 6, y: 5 });
        let food = state.food.expect("food respawned");
        assert!(!state.snake.occupies(food));
    }

    #[test]
    fn boosted_eating_adds_bonus_points() {
        let mut state = playing_state(10, 10, 5);
        state.snake = Snake::from_segments(
            vec![
                Position { x: 5, y: 5 },
                Position { x: 4, y: 5 },
                Position { x: 3, y: 5 },
            ],
            Direction::Right,
        );
        state.food = Some(Position { x: 6, y: 5 });
        state.set_boost(true);

        state.tick();

        assert_eq!(state.score, 15);
    }

    #[test]
    fn wall_collision_is_terminal_without_mutating_snake() {
        let mut state = playing_state(10, 10, 2);
        state.snake = Snake::from_segments(
            vec![
                Position { x: 0, y: 5 },
                Position { x: 1, y: 5 },
                Position { x: 2, y: 5 },
            ],
            Direction::Left,
        );

        state.tick();

        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(state.end_reason, Some(EndReason::WallCollision));
        assert_eq!(state.snake.head(), Position { x: 0, y: 5 });
        assert_eq!(state.snake.len(), 3);
    }

    #[test]
    fn self_collision_is_terminal_and_snake_stays_duplicate_free() {
        let mut state = playing_state(10, 10, 3);
        state.snake = Snake::from_segments(
            vec![
                Position { x: 2, y: 2 },
                Position { x: 1, y: 2 },
                Position { x: 1, y: 3 },
                Position { x: 2, y: 3 },
                Position { x: 3, y: 3 },
                Position { x: 3, y: 2 },
            ],
            Direction::Left,
        );
        state.set_intended_direction(Direction::Down);

        state.tick();

        assert_eq!(state.status, GameStatus::GameOver);
        assert_eq!(state.end_reason, Some(EndReason::SelfCollision));
        let cells: Vec<_> = state.snake.segments().copied().collect();
        for (i, cell) in cells.iter().enumerate() {
            assert!(!cells[..i].contains(cell), "duplicate cell {cell:?}");
        }
    }

    #[test]
    fn tick_is_a_no_op_while_paused_or_terminal() {
        let mut state = playing_state(10, 10, 6);
        state.toggle_pause();
        let head = state.snake.head();

        state.tick();
        assert_eq!(state.snake.head(), head);
        assert_eq!(state.status, GameStatus::Paused);

        state.toggle_pause();
        state.end_episode(EndReason::Quit);
        state.tick();
        assert_eq!(state.snake.head(), head);
        assert_eq!(state.status, GameStatus::GameOver);
    }

    #[test]
    fn boost_activation_counter_is_edge_triggered() {
        let mut state = playing_state(10, 10, 7);

        state.set_boost(true);
        state.set_boost(true);
        assert_eq!(state.boost_activations, 1);
        assert_eq!(state.speed_ms, BOOST_TICK_MS);

        state.set_boost(false);
        assert_eq!(state.speed_ms, NORMAL_TICK_MS);

        state.set_boost(true);
        assert_eq!(state.boost_activations, 2);
    }

    #[test]
    fn boost_cannot_activate_while_paused() {
        let mut state = playing_state(10, 10, 8);
        state.toggle_pause();

        state.set_boost(true);

        assert!(!state.boost);
        assert_eq!(state.boost_activations, 0);
    }

    #[test]
    fn filling_the_board_ends_in_victory() {
        // 2×2 board, snake in three cells, food in the last one. Eating it
        // leaves no free cell to respawn on.
        let mut state = playing_state(2, 2, 9);
        state.snake = Snake::from_segments(
            vec![
                Position { x: 0, y: 0 },
                Position { x: 1, y: 0 },
                Position { x: 1, y: 1 },
            ],
            Direction::Down,
        );
        state.food = Some(Position { x: 0, y: 1 });

        state.tick();

        assert_eq!(state.status, GameStatus::Victory);
        assert_eq!(state.end_reason, Some(EndReason::BoardFull));
        assert_eq!(state.food, None);
        assert_eq!(state.snake.len(), 4);
    }

    #[test]
    fn grid_fits_start_requires_room_for_the_tail() {
        assert!(grid_fits_start(GridSize {
            width: 4,
            height: 1
        }));
        assert!(grid_fits_start(GridSize {
            width: 20,
            height: 20
        }));
        assert!(!grid_fits_start(GridSize {
            width: 3,
            height: 3
        }));
        assert!(!grid_fits_start(GridSize {
            width: 10,
            height: 0
        }));
    }

    #[test]
    fn reset_on_a_minimal_grid_stays_in_bounds_with_food() {
        let mut state = GameState::new_with_seed(
            GridSize {
                width: 4,
                height: 1,
            },
            12,
        );
        state.reset();

        assert_eq!(state.status, GameStatus::Playing);
        for cell in state.snake.segments() {
            assert!(cell.is_within_bounds(state.bounds()));
        }
        // Only one free cell is left on a 4×1 grid.
        assert_eq!(state.food, Some(Position { x: 3, y: 0 }));
    }

    #[test]
    fn restoring_a_full_board_save_is_a_board_full_win() {
        let mut state = GameState::new_with_seed(
            GridSize {
                width: 2,
                height: 2,
            },
            13,
        );
        let record = GameStateRecord {
            player_id: "p1".into(),
            score: 40,
            high_score: 40,
            snake_positions: vec![
                Position { x: 0, y: 0 },
                Position { x: 1, y: 0 },
                Position { x: 1, y: 1 },
                Position { x: 0, y: 1 },
            ],
            food_position: None,
            direction: Direction::Left.into(),
            game_speed: 150,
        };

        state.restore(&record).expect("restore");

        assert_eq!(state.status, GameStatus::Victory);
        assert_eq!(state.end_reason, Some(EndReason::BoardFull));
        assert_eq!(state.food, None);
        assert_eq!(state.score, 40);
    }

    #[test]
    fn reset_advances_the_episode_number() {
        let mut state = GameState::new_with_seed(
            GridSize {
                width: 10,
                height: 10,
            },
            10,
        );
        assert_eq!(state.episode(), 0);

        state.reset();
        state.reset();

        assert_eq!(state.episode(), 2);
    }
}
