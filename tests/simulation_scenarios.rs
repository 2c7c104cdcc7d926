use neon_snake::config::GridSize;
use neon_snake::game::{EndReason, GameState, GameStatus};
use neon_snake::input::{Direction, GameInput};
use neon_snake::snake::{Position, Snake};

fn grid(width: u16, height: u16) -> GridSize {
    GridSize { width, height }
}

#[test]
fn food_collection_scenario_on_a_ten_by_ten_grid() {
    let mut state = GameState::new_with_seed(grid(10, 10), 42);
    state.reset();
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

    let snapshot = state.snapshot();
    assert_eq!(
        snapshot.snake,
        vec![
            Position { x: 6, y: 5 },
            Position { x: 5, y: 5 },
            Position { x: 4, y: 5 },
            Position { x: 3, y: 5 },
        ]
    );
    assert_eq!(snapshot.score, 10);
    let food = snapshot.food.expect("food respawned");
    assert!(!snapshot.snake.contains(&food));
}

#[test]
fn boosted_food_collection_scores_fifteen() {
    let mut state = GameState::new_with_seed(grid(10, 10), 42);
    state.reset();
    state.snake = Snake::from_segments(
        vec![
            Position { x: 5, y: 5 },
            Position { x: 4, y: 5 },
            Position { x: 3, y: 5 },
        ],
        Direction::Right,
    );
    state.food = Some(Position { x: 6, y: 5 });
    state.apply_input(GameInput::Boost(true));

    state.tick();

    assert_eq!(state.score, 15);
}

#[test]
fn leaving_the_grid_on_the_left_is_terminal() {
    let mut state = GameState::new_with_seed(grid(10, 10), 7);
    state.reset();
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

    // Terminal without an explicit reset; further ticks change nothing.
    let before = state.snapshot();
    state.tick();
    let after = state.snapshot();
    assert_eq!(before.snake, after.snake);
    assert_eq!(before.score, after.score);

    state.reset();
    assert_eq!(state.status, GameStatus::Playing);
}

#[test]
fn reversal_input_never_reaches_the_pending_direction() {
    let mut state = GameState::new_with_seed(grid(12, 12), 3);
    state.reset();
    assert_eq!(state.snake.direction(), Direction::Right);

    state.set_intended_direction(Direction::Left);
    assert_eq!(state.snake.pending_direction(), Direction::Right);

    state.set_intended_direction(Direction::Down);
    state.set_intended_direction(Direction::Up);
    assert_eq!(state.snake.pending_direction(), Direction::Up);
}

#[test]
fn paused_ticks_keep_state_but_buffer_input() {
    let mut state = GameState::new_with_seed(grid(12, 12), 5);
    state.reset();
    state.toggle_pause();

    let head = state.snake.head();
    state.set_intended_direction(Direction::Down);
    state.tick();

    assert_eq!(state.snake.head(), head);
    assert_eq!(state.snake.pending_direction(), Direction::Down);

    state.toggle_pause();
    state.tick();
    assert_eq!(state.snake.head(), head.stepped(Direction::Down));
}

#[test]
fn stepwise_food_collection_then_wall_collision() {
    let mut state = GameState::new_with_seed(grid(6, 4), 42);
    state.reset();
    state.snake = Snake::from_segments(vec![Position { x: 1, y: 1 }], Direction::Right);
    state.food = Some(Position { x: 2, y: 1 });

    state.tick();
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.score, 10);
    assert_eq!(state.snake.len(), 2);
    assert_eq!(state.snake.head(), Position { x: 2, y: 1 });

    state.apply_input(GameInput::Direction(Direction::Up));
    state.tick();
    assert_eq!(state.status, GameStatus::Playing);
    assert_eq!(state.snake.head(), Position { x: 2, y: 0 });

    state.tick();
    assert_eq!(state.status, GameStatus::GameOver);
    assert_eq!(state.end_reason, Some(EndReason::WallCollision));
}

#[test]
fn every_reachable_state_keeps_snake_and_food_disjoint() {
    // Drive a seeded episode with a fixed input script and check the core
    // invariants after every tick.
    let mut state = GameState::new_with_seed(grid(8, 8), 1234);
    state.reset();

    let script = [
        Some(Direction::Down),
        None,
        Some(Direction::Left),
        None,
        Some(Direction::Up),
        None,
        Some(Direction::Right),
        None,
    ];

    for step in 0..200 {
        if let Some(direction) = script[step % script.len()] {
            state.set_intended_direction(direction);
        }
        state.tick();

        let snapshot = state.snapshot();
        for (i, cell) in snapshot.snake.iter().enumerate() {
            assert!(
                !snapshot.snake[..i].contains(cell),
                "duplicate snake cell {cell:?} at step {step}"
            );
        }
        if let Some(food) = snapshot.food {
            assert!(
                !snapshot.snake.contains(&food),
                "food {food:?} on snake at step {step}"
            );
        }
        if snapshot.status != GameStatus::Playing {
            break;
        }
    }
}
