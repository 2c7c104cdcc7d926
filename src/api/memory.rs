use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde_json::{json, Value};

use super::error::RemoteError;
use super::types::{
    Ack, GameStateRecord, LeaderboardEntry, LeaderboardPosition, Player, PlayerPatch,
    SessionRecord, Statistics,
};
use super::Remote;

/// In-process implementation of the remote store contract.
///
/// Mirrors the server's observable semantics — unique usernames, save
/// upserts, append-only session history, score-descending leaderboard,
/// statistics recomputed on query — and backs both `--offline` play and the
/// persistence tests.
#[derive(Debug, Default)]
pub struct MemoryRemote {
    inner: Mutex<Inner>,
    next_id: AtomicU64,
}

#[derive(Debug, Default)]
struct Inner {
    players: HashMap<String, Player>,
    saves: HashMap<String, GameStateRecord>,
    /// Oldest-first per player; listings reverse this.
    sessions: HashMap<String, Vec<SessionRecord>>,
}

impl MemoryRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_id(&self) -> String {
        format!("local-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn statistics_of(inner: &Inner, player_id: &str) -> Statistics {
        let sessions = inner.sessions.get(player_id).map_or(&[][..], Vec::as_slice);

        let total_games = sessions.len() as u32;
        let total_score: u64 = sessions.iter().map(|s| u64::from(s.score)).sum();
        Statistics {
            total_games,
            total_score,
            average_score: if total_games == 0 {
                0.0
            } else {
                total_score as f64 / f64::from(total_games)
            },
            highest_score: sessions.iter().map(|s| s.score).max().unwrap_or(0),
            longest_snake: sessions.iter().map(|s| s.snake_length).max().unwrap_or(0),
            total_food_eaten: sessions.iter().map(|s| s.food_eaten).sum(),
            total_play_time_seconds: sessions.iter().map(|s| s.duration_seconds).sum(),
            speed_boosts_used: sessions.iter().map(|s| s.speed_boosts_used).sum(),
        }
    }

    fn best_scores(inner: &Inner) -> Vec<LeaderboardEntry> {
        let mut rows: Vec<LeaderboardEntry> = inner
            .players
            .values()
            .filter_map(|player| {
                let sessions = inner.sessions.get(&player.id)?;
                let best = sessions.iter().max_by_key(|s| s.score)?;
                Some(LeaderboardEntry {
                    player_id: player.id.clone(),
                    username: player.username.clone(),
                    score: best.score,
                    snake_length: best.snake_length,
                    rank: None,
                })
            })
            .collect();

        rows.sort_by(|a, b| b.score.cmp(&a.score).then(a.username.cmp(&b.username)));
        for (i, row) in rows.iter_mut().enumerate() {
            row.rank = Some(i as u32 + 1);
        }
        rows
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Lock poisoning only happens after a panic in this process; the
        // store data is still coherent for the remaining threads.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Remote for MemoryRemote {
    fn create_player(&self, username: &str, email: Option<&str>) -> Result<Player, RemoteError> {
        let mut inner = self.lock();
        if inner.players.values().any(|p| p.username == username) {
            return Err(RemoteError::Conflict("Username already exists".into()));
        }

        let player = Player {
            id: self.fresh_id(),
            username: username.to_owned(),
            email: email.map(str::to_owned),
            highest_score: 0,
            total_games_played: 0,
            longest_snake: 0,
        };
        inner.players.insert(player.id.clone(), player.clone());
        Ok(player)
    }

    fn get_player(&self, player_id: &str) -> Result<Player, RemoteError> {
        self.lock()
            .players
            .get(player_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound("Player not found".into()))
    }

    fn get_player_by_username(&self, username: &str) -> Result<Player, RemoteError> {
        self.lock()
            .players
            .values()
            .find(|p| p.username == username)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound("Player not found".into()))
    }

    fn update_player(&self, player_id: &str, patch: &PlayerPatch) -> Result<Player, RemoteError> {
        let mut inner = self.lock();
        if let Some(username) = &patch.username {
            if inner
                .players
                .values()
                .any(|p| p.username == *username && p.id != player_id)
            {
                return Err(RemoteError::Conflict("Username already exists".into()));
            }
        }

        let player = inner
            .players
            .get_mut(player_id)
            .ok_or_else(|| RemoteError::NotFound("Player not found".into()))?;
        if let Some(username) = &patch.username {
            player.username = username.clone();
        }
        if let Some(email) = &patch.email {
            player.email = Some(email.clone());
        }
        Ok(player.clone())
    }

    fn save_game(&self, record: &GameStateRecord) -> Result<Ack, RemoteError> {
        let mut inner = self.lock();
        if !inner.players.contains_key(&record.player_id) {
            return Err(RemoteError::NotFound("Player not found".into()));
        }
        inner
            .saves
            .insert(record.player_id.clone(), record.clone());
        Ok(Ack {
            success: true,
            message: "Game state saved successfully".into(),
        })
    }

    fn load_game(&self, player_id: &str) -> Result<GameStateRecord, RemoteError> {
        self.lock()
            .saves
            .get(player_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound("No saved game found".into()))
    }

    fn delete_game(&self, player_id: &str) -> Result<Ack, RemoteError> {
        let removed = self.lock().saves.remove(player_id).is_some();
        Ok(Ack {
            success: true,
            message: format!("Deleted {} game states", u8::from(removed)),
        })
    }

    fn record_session(&self, record: &SessionRecord) -> Result<Ack, RemoteError> {
        let mut inner = self.lock();
        if !inner.players.contains_key(&record.player_id) {
            return Err(RemoteError::NotFound("Player not found".into()));
        }
        inner
            .sessions
            .entry(record.player_id.clone())
            .or_default()
            .push(record.clone());

        let stats = Self::statistics_of(&inner, &record.player_id);
        if let Some(player) = inner.players.get_mut(&record.player_id) {
            player.highest_score = stats.highest_score;
            player.total_games_played = stats.total_games;
            player.longest_snake = stats.longest_snake;
        }
        Ok(Ack {
            success: true,
            message: "Game session recorded successfully".into(),
        })
    }

    fn sessions(&self, player_id: &str, limit: u32) -> Result<Vec<SessionRecord>, RemoteError> {
        let inner = self.lock();
        let sessions = inner.sessions.get(player_id).map_or(&[][..], Vec::as_slice);
        Ok(sessions
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, RemoteError> {
        let inner = self.lock();
        let mut rows = Self::best_scores(&inner);
        rows.truncate(limit as usize);
        Ok(rows)
    }

    fn leaderboard_position(&self, player_id: &str) -> Result<LeaderboardPosition, RemoteError> {
        let inner = self.lock();
        let rows = Self::best_scores(&inner);
        let row = rows.iter().find(|r| r.player_id == player_id);
        Ok(match row {
            Some(row) => LeaderboardPosition {
                rank: row.rank,
                score: Some(row.score),
                snake_length: Some(row.snake_length),
                message: None,
            },
            None => LeaderboardPosition {
                rank: None,
                score: None,
                snake_length: None,
                message: Some("Player not found in leaderboard".into()),
            },
        })
    }

    fn statistics(&self, player_id: &str) -> Result<Statistics, RemoteError> {
        Ok(Self::statistics_of(&self.lock(), player_id))
    }

    fn export_data(&self, player_id: &str) -> Result<Value, RemoteError> {
        let inner = self.lock();
        let player = inner
            .players
            .get(player_id)
            .ok_or_else(|| RemoteError::NotFound("Player not found".into()))?;

        let sessions: Vec<&SessionRecord> = inner
            .sessions
            .get(player_id)
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .rev()
            .take(50)
            .collect();

        Ok(json!({
            "player_id": player_id,
            "username": player.username,
            "statistics": Self::statistics_of(&inner, player_id),
            "recent_sessions": sessions,
            "saved_game_state": inner.saves.get(player_id),
            "version": "1.0.0",
        }))
    }

    fn import_data(&self, player_id: &str, bundle: &Value) -> Result<Ack, RemoteError> {
        let recognized = bundle
            .as_object()
            .is_some_and(|obj| obj.contains_key("player_id") && obj.contains_key("username"));
        if !recognized {
            return Err(RemoteError::InvalidFormat(
                "export bundle missing player_id/username".into(),
            ));
        }
        if !self.lock().players.contains_key(player_id) {
            return Err(RemoteError::NotFound("Player not found".into()));
        }
        Ok(Ack {
            success: true,
            message: "Import request recorded successfully".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::api::error::RemoteError;
    use crate::api::types::SessionRecord;
    use crate::api::Remote;

    use super::MemoryRemote;

    fn session(player_id: &str, score: u32, snake_length: u32) -> SessionRecord {
        SessionRecord {
            player_id: player_id.to_owned(),
            score,
            snake_length,
            duration_seconds: 60,
            food_eaten: score / 10,
            speed_boosts_used: 1,
            game_ended_reason: "wall_collision".into(),
        }
    }

    #[test]
    fn duplicate_username_conflicts() {
        let store = MemoryRemote::new();
        store.create_player("alice", None).expect("first create");

        let err = store.create_player("alice", None).unwrap_err();
        assert!(matches!(err, RemoteError::Conflict(_)));
    }

    #[test]
    fn sessions_list_most_recent_first_and_bounded() {
        let store = MemoryRemote::new();
        let player = store.create_player("bob", None).expect("create");

        for score in [10, 20, 30] {
            store
                .record_session(&session(&player.id, score, 4))
                .expect("record");
        }

        let recent = store.sessions(&player.id, 2).expect("list");
        let scores: Vec<u32> = recent.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![30, 20]);
    }

    #[test]
    fn leaderboard_orders_by_best_score_descending() {
        let store = MemoryRemote::new();
        let a = store.create_player("a", None).expect("create");
        let b = store.create_player("b", None).expect("create");
        store.record_session(&session(&a.id, 40, 5)).expect("record");
        store.record_session(&session(&a.id, 20, 4)).expect("record");
        store.record_session(&session(&b.id, 70, 8)).expect("record");

        let rows = store.leaderboard(10).expect("leaderboard");
        assert_eq!(rows[0].username, "b");
        assert_eq!(rows[0].rank, Some(1));
        assert_eq!(rows[1].score, 40);

        let position = store.leaderboard_position(&a.id).expect("position");
        assert_eq!(position.rank, Some(2));
    }

    #[test]
    fn statistics_aggregate_session_history() {
        let store = MemoryRemote::new();
        let player = store.create_player("carol", None).expect("create");
        store
            .record_session(&session(&player.id, 50, 6))
            .expect("record");
        store
            .record_session(&session(&player.id, 30, 5))
            .expect("record");

        let stats = store.statistics(&player.id).expect("stats");
        assert_eq!(stats.total_games, 2);
        assert_eq!(stats.highest_score, 50);
        assert_eq!(stats.longest_snake, 6);
        assert!((stats.average_score - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn export_bundle_round_trips_through_import() {
        let store = MemoryRemote::new();
        let player = store.create_player("dave", None).expect("create");
        store
            .record_session(&session(&player.id, 10, 4))
            .expect("record");

        let bundle = store.export_data(&player.id).expect("export");
        let ack = store.import_data(&player.id, &bundle).expect("import");
        assert!(ack.success);

        let err = store
            .import_data(&player.id, &serde_json::json!({ "nope": 1 }))
            .unwrap_err();
        assert!(matches!(err, RemoteError::InvalidFormat(_)));
    }
}
