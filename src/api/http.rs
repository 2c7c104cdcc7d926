use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::error::RemoteError;
use super::types::{
    Ack, GameStateRecord, ImportEnvelope, LeaderboardEntry, LeaderboardPosition, NewPlayer, Player,
    PlayerPatch, SessionRecord, Statistics,
};
use super::Remote;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Error envelope the store attaches to failed responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Blocking HTTP client for the remote game store.
///
/// Blocking by design: it always runs on the sync worker thread (or in
/// one-shot CLI actions), never on the tick loop.
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpClient {
    /// Creates a client for a base URL such as `http://localhost:8000/api`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            agent: ureq::AgentBuilder::new()
                .timeout(REQUEST_TIMEOUT)
                .build(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let response = self.agent.get(&self.url(path)).call();
        parse_response(response)
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: impl serde::Serialize,
    ) -> Result<T, RemoteError> {
        let response = self.agent.request(method, &self.url(path)).send_json(body);
        parse_response(response)
    }
}

fn parse_response<T: DeserializeOwned>(
    response: Result<ureq::Response, ureq::Error>,
) -> Result<T, RemoteError> {
    match response {
        Ok(ok) => ok
            .into_json::<T>()
            .map_err(|e| RemoteError::InvalidFormat(e.to_string())),
        Err(ureq::Error::Status(status, body)) => {
            let message = body
                .into_json::<ErrorBody>()
                .ok()
                .and_then(|e| e.detail.or(e.message))
                .unwrap_or_else(|| format!("HTTP {status}"));
            Err(RemoteError::from_status(status, message))
        }
        Err(ureq::Error::Transport(transport)) => {
            Err(RemoteError::Unreachable(transport.to_string()))
        }
    }
}

impl Remote for HttpClient {
    fn create_player(&self, username: &str, email: Option<&str>) -> Result<Player, RemoteError> {
        self.send("POST", "/game/players", NewPlayer { username, email })
    }

    fn get_player(&self, player_id: &str) -> Result<Player, RemoteError> {
        self.get(&format!("/game/players/{player_id}"))
    }

    fn get_player_by_username(&self, username: &str) -> Result<Player, RemoteError> {
        self.get(&format!("/game/players/username/{username}"))
    }

    fn update_player(&self, player_id: &str, patch: &PlayerPatch) -> Result<Player, RemoteError> {
        self.send("PUT", &format!("/game/players/{player_id}"), patch)
    }

    fn save_game(&self, record: &GameStateRecord) -> Result<Ack, RemoteError> {
        self.send("POST", "/game/save-game", record)
    }

    fn load_game(&self, player_id: &str) -> Result<GameStateRecord, RemoteError> {
        self.get(&format!("/game/load-game/{player_id}"))
    }

    fn delete_game(&self, player_id: &str) -> Result<Ack, RemoteError> {
        let response = self
            .agent
            .delete(&self.url(&format!("/game/game-state/{player_id}")))
            .call();
        parse_response(response)
    }

    fn record_session(&self, record: &SessionRecord) -> Result<Ack, RemoteError> {
        self.send("POST", "/game/sessions", record)
    }

    fn sessions(&self, player_id: &str, limit: u32) -> Result<Vec<SessionRecord>, RemoteError> {
        self.get(&format!("/game/sessions/{player_id}?limit={limit}"))
    }

    fn leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, RemoteError> {
        self.get(&format!("/game/leaderboard?limit={limit}"))
    }

    fn leaderboard_position(&self, player_id: &str) -> Result<LeaderboardPosition, RemoteError> {
        self.get(&format!("/game/leaderboard/player/{player_id}"))
    }

    fn statistics(&self, player_id: &str) -> Result<Statistics, RemoteError> {
        self.get(&format!("/game/statistics/{player_id}"))
    }

    fn export_data(&self, player_id: &str) -> Result<Value, RemoteError> {
        self.get(&format!("/game/export/{player_id}"))
    }

    fn import_data(&self, player_id: &str, bundle: &Value) -> Result<Ack, RemoteError> {
        self.send(
            "POST",
            &format!("/game/import/{player_id}"),
            ImportEnvelope {
                export_data: bundle.clone(),
            },
        )
        .map_err(|error| match error {
            // The store rejects unrecognized bundles with a client error.
            RemoteError::Api {
                status: 400 | 422,
                message,
            } => RemoteError::InvalidFormat(message),
            other => other,
        })
    }
}
