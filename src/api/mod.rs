//! Request/response façade over the remote game store.
//!
//! One trait method per remote capability; every call is single-shot with no
//! retries here — retry policy belongs to the callers (identity resolution
//! retries a conflicted create once, everything else degrades locally).

pub mod error;
pub mod http;
pub mod memory;
pub mod types;

use serde_json::Value;

pub use error::RemoteError;
pub use http::HttpClient;
pub use memory::MemoryRemote;

use types::{
    Ack, GameStateRecord, LeaderboardEntry, LeaderboardPosition, Player, PlayerPatch,
    SessionRecord, Statistics,
};

/// The remote game store, one method per endpoint.
pub trait Remote {
    /// Creates a player; `Conflict` when the username is taken.
    fn create_player(&self, username: &str, email: Option<&str>) -> Result<Player, RemoteError>;

    /// Looks a player up by id; `NotFound` when unknown.
    fn get_player(&self, player_id: &str) -> Result<Player, RemoteError>;

    /// Looks a player up by username; `NotFound` when unknown.
    fn get_player_by_username(&self, username: &str) -> Result<Player, RemoteError>;

    /// Patches a player profile.
    fn update_player(&self, player_id: &str, patch: &PlayerPatch) -> Result<Player, RemoteError>;

    /// Upserts the player's saved game, replacing any previous save.
    fn save_game(&self, record: &GameStateRecord) -> Result<Ack, RemoteError>;

    /// Fetches the player's saved game; `NotFound` when none exists.
    fn load_game(&self, player_id: &str) -> Result<GameStateRecord, RemoteError>;

    /// Discards the player's saved game.
    fn delete_game(&self, player_id: &str) -> Result<Ack, RemoteError>;

    /// Appends one completed episode to the player's history.
    fn record_session(&self, record: &SessionRecord) -> Result<Ack, RemoteError>;

    /// Lists recent sessions, most recent first, at most `limit`.
    fn sessions(&self, player_id: &str, limit: u32) -> Result<Vec<SessionRecord>, RemoteError>;

    /// Top scores, descending, at most `limit` rows.
    fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, RemoteError>;

    /// The player's rank among all best scores.
    fn leaderboard_position(&self, player_id: &str) -> Result<LeaderboardPosition, RemoteError>;

    /// Aggregate statistics derived from the player's session history.
    fn statistics(&self, player_id: &str) -> Result<Statistics, RemoteError>;

    /// Exports the player's data as an opaque bundle.
    fn export_data(&self, player_id: &str) -> Result<Value, RemoteError>;

    /// Imports a previously exported bundle; `InvalidFormat` when it is not
    /// recognized.
    fn import_data(&self, player_id: &str, bundle: &Value) -> Result<Ack, RemoteError>;
}
