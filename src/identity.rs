use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::api::types::Player;
use crate::api::{Remote, RemoteError};

const APP_DIR_NAME: &str = "neon-snake";
const PLAYER_FILE_NAME: &str = "player.json";

/// Returns the platform-correct cached player file path.
#[must_use]
pub fn player_cache_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(PLAYER_FILE_NAME);
    base
}

/// Loads the locally cached player, if any.
///
/// An unreadable or malformed cache is treated as absent — the resolver
/// will re-create the player remotely.
#[must_use]
pub fn load_cached_player(path: &Path) -> Option<Player> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

/// Caches the resolved player, creating parent directories when needed.
pub fn store_cached_player(path: &Path, player: &Player) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(player)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
    fs::write(path, json)
}

/// Removes the cached player after failed remote verification.
pub fn discard_cached_player(path: &Path) {
    let _ = fs::remove_file(path);
}

/// Establishes the player identity against the remote store.
///
/// Order of preference: verified local cache, existing remote player with
/// the requested username, freshly created player. Creation retries exactly
/// once with a timestamp-disambiguated username when the name is taken; any
/// other failure is fatal for this initialization attempt. The cache is
/// rewritten only after a successful remote round trip.
pub fn resolve_player(
    remote: &dyn Remote,
    cache_path: &Path,
    preferred_username: Option<&str>,
) -> Result<Player, RemoteError> {
    if let Some(cached) = load_cached_player(cache_path) {
        match remote.get_player(&cached.id) {
            Ok(player) => {
                let _ = store_cached_player(cache_path, &player);
                return Ok(player);
            }
            // The cached identity no longer exists remotely; fall through
            // to re-creation with a clean slate.
            Err(RemoteError::NotFound(_)) => discard_cached_player(cache_path),
            Err(other) => return Err(other),
        }
    }

    if let Some(username) = preferred_username {
        match remote.get_player_by_username(username) {
            Ok(player) => {
                let _ = store_cached_player(cache_path, &player);
                return Ok(player);
            }
            Err(RemoteError::NotFound(_)) => {}
            Err(other) => return Err(other),
        }
    }

    let username = preferred_username
        .map(str::to_owned)
        .unwrap_or_else(|| format!("Player_{}", timestamp_millis()));

    let player = match remote.create_player(&username, None) {
        Ok(player) => player,
        Err(RemoteError::Conflict(_)) => {
            let retry = format!("{username}_{}", timestamp_millis());
            remote.create_player(&retry, None)?
        }
        Err(other) => return Err(other),
    };

    let _ = store_cached_player(cache_path, &player);
    Ok(player)
}

fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::api::types::{Player, PlayerPatch};
    use crate::api::{MemoryRemote, Remote};

    use super::{load_cached_player, resolve_player, store_cached_player};

    fn unique_cache_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();

        std::env::temp_dir()
            .join("neon-snake-identity-tests")
            .join(format!("{label}-{nanos}.json"))
    }

    fn cleanup(path: &PathBuf) {
        let _ = fs::remove_file(path);
    }

    #[test]
    fn creates_and_caches_a_player_when_no_cache_exists() {
        let store = MemoryRemote::new();
        let path = unique_cache_path("fresh");

        let player = resolve_player(&store, &path, Some("alice")).expect("resolve");

        assert_eq!(player.username, "alice");
        let cached = load_cached_player(&path).expect("cache written");
        assert_eq!(cached.id, player.id);
        cleanup(&path);
    }

    #[test]
    fn verified_cache_short_circuits_creation() {
        let store = MemoryRemote::new();
        let path = unique_cache_path("cached");
        let created = store.create_player("bob", None).expect("create");
        store_cached_player(&path, &created).expect("seed cache");

        let player = resolve_player(&store, &path, None).expect("resolve");

        assert_eq!(player.id, created.id);
        cleanup(&path);
    }

    #[test]
    fn stale_cache_is_discarded_and_player_recreated() {
        let store = MemoryRemote::new();
        let path = unique_cache_path("stale");
        let ghost = Player {
            id: "gone".into(),
            username: "ghost".into(),
            email: None,
            highest_score: 0,
            total_games_played: 0,
            longest_snake: 0,
        };
        store_cached_player(&path, &ghost).expect("seed cache");

        let player = resolve_player(&store, &path, Some("carol")).expect("resolve");

        assert_eq!(player.username, "carol");
        assert_ne!(player.id, "gone");
        cleanup(&path);
    }

    #[test]
    fn verification_refreshes_the_cached_record() {
        let store = MemoryRemote::new();
        let path = unique_cache_path("refresh");
        let created = store.create_player("dora", None).expect("create");
        store_cached_player(&path, &created).expect("seed cache");

        store
            .update_player(
                &created.id,
                &PlayerPatch {
                    username: Some("dora_the_second".into()),
                    email: None,
                },
            )
            .expect("rename");

        let player = resolve_player(&store, &path, None).expect("resolve");
        assert_eq!(player.username, "dora_the_second");

        let cached = load_cached_player(&path).expect("cache refreshed");
        assert_eq!(cached.username, "dora_the_second");
        cleanup(&path);
    }

    #[test]
    fn existing_username_is_adopted_not_duplicated() {
        let store = MemoryRemote::new();
        let path = unique_cache_path("adopt");
        let existing = store.create_player("erin", None).expect("create");

        let player = resolve_player(&store, &path, Some("erin")).expect("resolve");

        assert_eq!(player.id, existing.id);
        cleanup(&path);
    }
}
