use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::game::GameSnapshot;
use crate::snake::Position;

/// Wire form of a direction: a `{x, y}` unit vector.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct DirectionVector {
    pub x: i32,
    pub y: i32,
}

impl From<crate::input::Direction> for DirectionVector {
    fn from(direction: crate::input::Direction) -> Self {
        let (x, y) = direction.delta();
        Self { x, y }
    }
}

/// Player record; the remote store is the source of truth, a copy is cached
/// locally by the identity resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub highest_score: u32,
    #[serde(default)]
    pub total_games_played: u32,
    #[serde(default)]
    pub longest_snake: u32,
}

/// Fields sent when creating a player.
#[derive(Debug, Clone, Serialize)]
pub struct NewPlayer<'a> {
    pub username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
}

/// Partial player update; only present fields are patched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Saved game snapshot; at most one per player (upsert semantics).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameStateRecord {
    pub player_id: String,
    pub score: u32,
    pub high_score: u32,
    pub snake_positions: Vec<Position>,
    #[serde(default)]
    pub food_position: Option<Position>,
    pub direction: DirectionVector,
    #[serde(default)]
    pub game_speed: u64,
}

impl GameStateRecord {
    /// Builds the save payload from an episode snapshot.
    #[must_use]
    pub fn from_snapshot(player_id: &str, snapshot: &GameSnapshot, high_score: u32) -> Self {
        Self {
            player_id: player_id.to_owned(),
            score: snapshot.score,
            high_score,
            snake_positions: snapshot.snake.clone(),
            food_position: snapshot.food,
            direction: snapshot.direction.into(),
            game_speed: snapshot.speed_ms,
        }
    }
}

/// Immutable record of one completed episode, appended to player history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    pub player_id: String,
    pub score: u32,
    pub snake_length: u32,
    pub duration_seconds: u64,
    pub food_eaten: u32,
    pub speed_boosts_used: u32,
    pub game_ended_reason: String,
}

/// One leaderboard row, descending by score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: String,
    pub username: String,
    pub score: u32,
    pub snake_length: u32,
    #[serde(default)]
    pub rank: Option<u32>,
}

/// A player's rank lookup; `rank` is absent when the player has no entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardPosition {
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub snake_length: Option<u32>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Aggregate statistics the store derives from a player's session history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub total_games: u32,
    #[serde(default)]
    pub total_score: u64,
    #[serde(default)]
    pub average_score: f64,
    #[serde(default)]
    pub highest_score: u32,
    #[serde(default)]
    pub longest_snake: u32,
    #[serde(default)]
    pub total_food_eaten: u32,
    #[serde(default)]
    pub total_play_time_seconds: u64,
    #[serde(default)]
    pub speed_boosts_used: u32,
}

/// Generic acknowledgement envelope returned by write endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// Wrapper posted to the import endpoint; the bundle itself stays opaque.
#[derive(Debug, Clone, Serialize)]
pub struct ImportEnvelope {
    pub export_data: Value,
}
