use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const APP_DIR_NAME: &str = "neon-snake";
const SCORE_FILE_NAME: &str = "scores.json";

/// Two-phase high score: a remote-confirmed value plus a local provisional
/// one updated optimistically on every tick.
///
/// Reconciliation is a max-merge, so late or re-ordered responses from the
/// store can never lower the displayed value, and no timestamping is needed.
/// The confirmed value is authoritative once any reconciliation has
/// happened; the provisional side only ever raises the display.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighScore {
    confirmed: u32,
    provisional: u32,
}

impl HighScore {
    /// Seeds the tracker from a fallback source (local cache file).
    #[must_use]
    pub fn with_fallback(value: u32) -> Self {
        Self {
            confirmed: 0,
            provisional: value,
        }
    }

    /// Raises the provisional value when the live score exceeds it.
    pub fn observe(&mut self, score: u32) {
        self.provisional = self.provisional.max(score);
    }

    /// Applies a remote-confirmed value (statistics response).
    pub fn reconcile(&mut self, remote: u32) {
        self.confirmed = self.confirmed.max(remote);
    }

    /// The value to display.
    #[must_use]
    pub fn best(&self) -> u32 {
        self.confirmed.max(self.provisional)
    }

    /// True once the live score beats everything previously known.
    #[must_use]
    pub fn is_record(&self, score: u32) -> bool {
        score > 0 && score >= self.best()
    }
}

/// Returns the platform-correct score fallback file path.
#[must_use]
pub fn scores_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(SCORE_FILE_NAME);
    base
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ScoreFile {
    high_score: u32,
}

/// Loads the cached high score from disk.
///
/// This is the display-only fallback used when the remote store is
/// unreachable; it never feeds gameplay decisions. Returns `Ok(0)` when the
/// file does not yet exist (first run).
pub fn load_cached_high_score() -> io::Result<u32> {
    load_from_path(&scores_path())
}

/// Writes the high score fallback, creating parent directories when needed.
pub fn save_cached_high_score(score: u32) -> io::Result<()> {
    save_to_path(&scores_path(), score)
}

fn load_from_path(path: &Path) -> io::Result<u32> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    serde_json::from_str::<ScoreFile>(&raw)
        .map(|file| file.high_score)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn save_to_path(path: &Path, score: u32) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let payload = ScoreFile { high_score: score };
    let json = serde_json::to_string_pretty(&payload)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;

    fs::write(path, json)
}
