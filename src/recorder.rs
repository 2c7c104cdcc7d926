use crate::api::types::SessionRecord;
use crate::game::{EndReason, GameSnapshot};

/// Builds and submits one immutable session record per finished episode.
///
/// The duplicate guard is keyed by episode number, so redrawing a terminal
/// frame (or a quit following a game over) cannot submit twice.
#[derive(Debug, Default)]
pub struct SessionRecorder {
    last_submitted_episode: Option<u64>,
}

impl SessionRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session record for this episode, or `None` when it was
    /// already taken.
    pub fn take_report(
        &mut self,
        player_id: &str,
        snapshot: &GameSnapshot,
        reason: EndReason,
    ) -> Option<SessionRecord> {
        if self.last_submitted_episode == Some(snapshot.episode) {
            return None;
        }
        self.last_submitted_episode = Some(snapshot.episode);

        Some(SessionRecord {
            player_id: player_id.to_owned(),
            score: snapshot.score,
            snake_length: snapshot.snake.len() as u32,
            duration_seconds: snapshot.elapsed.as_secs(),
            food_eaten: snapshot.food_eaten,
            speed_boosts_used: snapshot.boost_activations,
            game_ended_reason: reason.as_str().to_owned(),
        })
    }
}
