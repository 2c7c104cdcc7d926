use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use serde_json::Value;

use crate::api::types::{GameStateRecord, LeaderboardEntry, SessionRecord, Statistics};
use crate::api::{Remote, RemoteError};

/// Work the frontend hands to the background persistence thread.
#[derive(Debug)]
pub enum SyncCommand {
    SaveGame(GameStateRecord),
    LoadGame,
    DeleteSave,
    RecordSession(SessionRecord),
    FetchStatistics,
    FetchLeaderboard(u32),
    Export,
}

/// Request tagged with the episode that issued it.
#[derive(Debug)]
struct SyncRequest {
    episode: u64,
    command: SyncCommand,
}

/// Result of one remote operation.
#[derive(Debug)]
pub enum SyncOutcome {
    Saved,
    SaveFailed(RemoteError),
    Loaded(GameStateRecord),
    LoadFailed(RemoteError),
    SaveDeleted,
    DeleteFailed(RemoteError),
    SessionRecorded,
    SessionFailed(RemoteError),
    Statistics(Statistics),
    StatisticsFailed(RemoteError),
    Leaderboard(Vec<LeaderboardEntry>),
    LeaderboardFailed(RemoteError),
    Exported(Value),
    ExportFailed(RemoteError),
}

/// Completion delivered back to the frame loop.
///
/// Carries the episode of the originating request so the loop can discard
/// episode-scoped completions (saves, loads) that a later `reset` or
/// `restore` has made stale. Statistics and leaderboard outcomes are
/// episode-independent and always applied.
#[derive(Debug)]
pub struct SyncEvent {
    pub episode: u64,
    pub outcome: SyncOutcome,
}

impl SyncEvent {
    /// True when an episode-scoped outcome no longer matches the live
    /// episode and must be ignored.
    #[must_use]
    pub fn is_stale_for(&self, current_episode: u64) -> bool {
        match self.outcome {
            SyncOutcome::Saved
            | SyncOutcome::SaveFailed(_)
            | SyncOutcome::Loaded(_)
            | SyncOutcome::LoadFailed(_) => self.episode != current_episode,
            _ => false,
        }
    }
}

/// Handle to the background persistence thread.
///
/// A single worker serializes all remote calls, so completions arrive in
/// request order and the tick loop never blocks: `submit` enqueues,
/// `poll` drains whatever has finished. Dropping the handle shuts the
/// worker down.
pub struct SyncHandle {
    requests: Option<Sender<SyncRequest>>,
    events: Receiver<SyncEvent>,
    worker: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Spawns the worker around a remote client and the resolved player id.
    #[must_use]
    pub fn spawn(remote: Box<dyn Remote + Send>, player_id: String) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<SyncRequest>();
        let (event_tx, event_rx) = mpsc::channel::<SyncEvent>();

        let worker = thread::spawn(move || {
            while let Ok(request) = request_rx.recv() {
                let outcome = run_command(remote.as_ref(), &player_id, request.command);
                if event_tx
                    .send(SyncEvent {
                        episode: request.episode,
                        outcome,
                    })
                    .is_err()
                {
                    break;
                }
            }
        });

        Self {
            requests: Some(request_tx),
            events: event_rx,
            worker: Some(worker),
        }
    }

    /// Enqueues a command on behalf of `episode`. Never blocks.
    pub fn submit(&self, episode: u64, command: SyncCommand) {
        if let Some(requests) = &self.requests {
            let _ = requests.send(SyncRequest { episode, command });
        }
    }

    /// Returns the next finished completion, if any. Never blocks.
    pub fn poll(&self) -> Option<SyncEvent> {
        self.events.try_recv().ok()
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        drop(self.requests.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_command(remote: &dyn Remote, player_id: &str, command: SyncCommand) -> SyncOutcome {
    match command {
        SyncCommand::SaveGame(record) => match remote.save_game(&record) {
            Ok(_) => SyncOutcome::Saved,
            Err(e) => SyncOutcome::SaveFailed(e),
        },
        SyncCommand::LoadGame => match remote.load_game(player_id) {
            Ok(record) => SyncOutcome::Loaded(record),
            Err(e) => SyncOutcome::LoadFailed(e),
        },
        SyncCommand::DeleteSave => match remote.delete_game(player_id) {
            Ok(_) => SyncOutcome::SaveDeleted,
            Err(e) => SyncOutcome::DeleteFailed(e),
        },
        SyncCommand::RecordSession(record) => match remote.record_session(&record) {
            Ok(_) => SyncOutcome::SessionRecorded,
            Err(e) => SyncOutcome::SessionFailed(e),
        },
        SyncCommand::FetchStatistics => match remote.statistics(player_id) {
            Ok(stats) => SyncOutcome::Statistics(stats),
            Err(e) => SyncOutcome::StatisticsFailed(e),
        },
        SyncCommand::FetchLeaderboard(limit) => match remote.leaderboard(limit) {
            Ok(rows) => SyncOutcome::Leaderboard(rows),
            Err(e) => SyncOutcome::LeaderboardFailed(e),
        },
        SyncCommand::Export => match remote.export_data(player_id) {
            Ok(bundle) => SyncOutcome::Exported(bundle),
            Err(e) => SyncOutcome::ExportFailed(e),
        },
    }
}
