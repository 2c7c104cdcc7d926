use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

use neon_snake::api::types::GameStateRecord;
use neon_snake::api::{HttpClient, MemoryRemote, Remote, RemoteError};
use neon_snake::game::{grid_fits_start, EndReason, GameState, GameStatus};
use neon_snake::identity::{player_cache_path, resolve_player};
use neon_snake::input::{Direction, GameInput};
use neon_snake::recorder::SessionRecorder;
use neon_snake::renderer;
use neon_snake::scheduler::TickClock;
use neon_snake::score::{load_cached_high_score, save_cached_high_score, HighScore};
use neon_snake::sync::{SyncCommand, SyncHandle, SyncOutcome};
use neon_snake::terminal_runtime::TerminalSession;
use neon_snake::ui::hud::HudInfo;
use neon_snake::ui::notice::NoticeBoard;

const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(15);

#[derive(Debug, Parser)]
#[command(
    name = "neon-snake",
    about = "Grid snake with server-backed saves and leaderboards"
)]
struct Cli {
    /// Base URL of the game store API.
    #[arg(long, default_value = "http://localhost:8000/api")]
    server: String,

    /// Player username; defaults to the cached player or a generated name.
    #[arg(long)]
    username: Option<String>,

    /// Play against an in-process store instead of the remote one.
    #[arg(long)]
    offline: bool,

    /// Print the leaderboard and exit.
    #[arg(long)]
    leaderboard: bool,

    /// Print the player's statistics and rank and exit.
    #[arg(long)]
    stats: bool,

    /// Export the player's data to FILE and exit.
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Import a previously exported bundle from FILE and exit.
    #[arg(long, value_name = "FILE")]
    import: Option<PathBuf>,

    /// Delete the player's saved game and exit.
    #[arg(long)]
    clear_save: bool,

    /// Row limit for --leaderboard.
    #[arg(long, default_value_t = 10)]
    limit: u32,
}

/// Persistence backend for an interactive run with a resolved player.
struct Online {
    sync: SyncHandle,
    player_id: String,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    let remote: Box<dyn Remote + Send> = if cli.offline {
        Box::new(MemoryRemote::new())
    } else {
        Box::new(HttpClient::new(&cli.server))
    };

    if cli.leaderboard || cli.stats || cli.export.is_some() || cli.import.is_some() || cli.clear_save
    {
        return match run_one_shot(&cli, remote.as_ref()) {
            Ok(()) => Ok(()),
            Err(error) => {
                eprintln!("{error}");
                std::process::exit(1);
            }
        };
    }

    run(&cli, remote)
}

/// Non-interactive maintenance actions against the store.
fn run_one_shot(cli: &Cli, remote: &dyn Remote) -> Result<(), RemoteError> {
    if cli.leaderboard {
        let rows = remote.leaderboard(cli.limit)?;
        if rows.is_empty() {
            println!("Leaderboard is empty.");
        }
        for row in rows {
            println!(
                "{:>3}. {:<20} {:>6}  (length {})",
                row.rank.unwrap_or(0),
                row.username,
                row.score,
                row.snake_length
            );
        }
        return Ok(());
    }

    let player = resolve_player(remote, &player_cache_path(), cli.username.as_deref())?;

    if cli.stats {
        let stats = remote.statistics(&player.id)?;
        let position = remote.leaderboard_position(&player.id)?;
        println!("Player: {}", player.username);
        println!("Games played:      {}", stats.total_games);
        println!("Highest score:     {}", stats.highest_score);
        println!("Average score:     {:.1}", stats.average_score);
        println!("Longest snake:     {}", stats.longest_snake);
        println!("Food eaten:        {}", stats.total_food_eaten);
        println!("Play time:         {}s", stats.total_play_time_seconds);
        println!("Boosts used:       {}", stats.speed_boosts_used);
        match position.rank {
            Some(rank) => println!("Leaderboard rank:  #{rank}"),
            None => println!("Leaderboard rank:  unranked"),
        }

        let recent = remote.sessions(&player.id, cli.limit)?;
        if !recent.is_empty() {
            println!("Recent games:");
            for session in recent {
                println!(
                    "  {:>6} pts  length {:<3} {:>4}s  {}",
                    session.score,
                    session.snake_length,
                    session.duration_seconds,
                    session.game_ended_reason
                );
            }
        }
        return Ok(());
    }

    if let Some(path) = &cli.export {
        let bundle = remote.export_data(&player.id)?;
        let json = serde_json::to_string_pretty(&bundle)
            .map_err(|e| RemoteError::InvalidFormat(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| {
            RemoteError::Unreachable(format!("cannot write {}: {e}", path.display()))
        })?;
        println!("Exported player data to {}", path.display());
        return Ok(());
    }

    if let Some(path) = &cli.import {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RemoteError::InvalidFormat(format!("cannot read {}: {e}", path.display()))
        })?;
        let bundle: serde_json::Value =
            serde_json::from_str(&raw).map_err(|e| RemoteError::InvalidFormat(e.to_string()))?;
        let ack = remote.import_data(&player.id, &bundle)?;
        println!("{}", ack.message);
        return Ok(());
    }

    if cli.clear_save {
        remote.delete_game(&player.id)?;
        println!("Saved game deleted.");
    }
    Ok(())
}

/// Interactive game.
fn run(cli: &Cli, remote: Box<dyn Remote + Send>) -> io::Result<()> {
    let mut notices = NoticeBoard::new();
    let mut warnings: Vec<String> = Vec::new();

    // Identity first; an unreachable store degrades to fallback-only play
    // rather than failing startup.
    let resolved = resolve_player(remote.as_ref(), &player_cache_path(), cli.username.as_deref());
    let (username, online) = match resolved {
        Ok(player) => {
            let username = player.username.clone();
            let sync = SyncHandle::spawn(remote, player.id.clone());
            (
                username,
                Some(Online {
                    sync,
                    player_id: player.id,
                }),
            )
        }
        Err(error) if error.is_unreachable() => {
            notices.warn("Store unreachable – playing offline (cached best score)");
            ("offline".to_owned(), None)
        }
        Err(error) => {
            return Err(io::Error::new(io::ErrorKind::Other, error.to_string()));
        }
    };
    let sync_label = match (&online, cli.offline) {
        (_, true) => "local",
        (Some(_), false) => "online",
        (None, false) => "offline",
    };

    let mut session = TerminalSession::enter()?;
    let bounds = session.play_grid()?;
    if !grid_fits_start(bounds) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "terminal is too small for the play grid",
        ));
    }

    let mut state = GameState::new(bounds);
    let fallback = load_cached_high_score().unwrap_or(0);
    state.high_score = HighScore::with_fallback(fallback);
    if let Some(online) = &online {
        online
            .sync
            .submit(state.episode(), SyncCommand::FetchStatistics);
    }

    let mut recorder = SessionRecorder::new();
    let mut clock = TickClock::new(Duration::from_millis(state.speed_ms));
    let mut last_status = state.status;

    loop {
        let now = Instant::now();
        let snapshot = state.snapshot();
        let hud = HudInfo {
            high_score: state.high_score.best(),
            username: username.clone(),
            sync_label,
        };
        session.terminal_mut().draw(|frame| {
            renderer::render(frame, &snapshot, bounds, &hud, &mut notices, now);
        })?;

        if event::poll(INPUT_POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && handle_key(key, &mut state, online.as_ref(), &mut clock, &mut notices)
                {
                    break;
                }
            }
        }

        let now = Instant::now();
        if clock.poll(now) {
            state.tick();
        }
        clock.reschedule(Duration::from_millis(state.speed_ms), now);

        if state.status != last_status {
            if state.status.is_terminal() {
                clock.stop();
                finish_episode(&mut state, online.as_ref(), &mut recorder, &mut warnings);
            }
            last_status = state.status;
        }

        drain_sync_events(
            &mut state,
            online.as_ref(),
            &mut clock,
            &mut notices,
            &mut warnings,
            &username,
        );
    }

    // Dropping the sync handle drains queued submissions (the quit session
    // record among them) before the worker joins.
    if matches!(state.status, GameStatus::GameOver | GameStatus::Victory) {
        finish_episode(&mut state, online.as_ref(), &mut recorder, &mut warnings);
    }
    for warning in warnings {
        session.defer_warning(warning);
    }
    drop(online);
    drop(session);
    Ok(())
}

/// Applies one key event; returns true when the game should exit.
fn handle_key(
    key: KeyEvent,
    state: &mut GameState,
    online: Option<&Online>,
    clock: &mut TickClock,
    notices: &mut NoticeBoard,
) -> bool {
    let input = match key.code {
        KeyCode::Up => Some(GameInput::Direction(Direction::Up)),
        KeyCode::Down => Some(GameInput::Direction(Direction::Down)),
        KeyCode::Left => Some(GameInput::Direction(Direction::Left)),
        KeyCode::Right => Some(GameInput::Direction(Direction::Right)),
        // Space toggles the boost level; raw terminals deliver no key-up.
        KeyCode::Char(' ') => Some(GameInput::Boost(!state.boost)),
        KeyCode::Char('p') => Some(GameInput::Pause),
        KeyCode::Enter => Some(GameInput::Confirm),
        KeyCode::Char('s') => Some(GameInput::Save),
        KeyCode::Char('l') => Some(GameInput::Load),
        KeyCode::Char('e') => Some(GameInput::Export),
        KeyCode::Char('q') | KeyCode::Esc => Some(GameInput::Quit),
        _ => None,
    };
    let Some(input) = input else {
        return false;
    };

    match input {
        GameInput::Confirm => {
            if state.status == GameStatus::Idle || state.status.is_terminal() {
                state.reset();
                clock.start(Duration::from_millis(state.speed_ms), Instant::now());
            }
        }
        GameInput::Save => {
            if matches!(state.status, GameStatus::Playing | GameStatus::Paused) {
                submit_save(state, online, notices);
            }
        }
        GameInput::Load => match online {
            Some(online) => online.sync.submit(state.episode(), SyncCommand::LoadGame),
            None => notices.warn("No store available to load from"),
        },
        GameInput::Export => match online {
            Some(online) => online.sync.submit(state.episode(), SyncCommand::Export),
            None => notices.warn("No store available to export from"),
        },
        GameInput::Quit => {
            // Quitting mid-episode saves and records the session as "quit".
            if matches!(state.status, GameStatus::Playing | GameStatus::Paused) {
                submit_save(state, online, notices);
                state.end_episode(EndReason::Quit);
            }
            return true;
        }
        other => {
            state.apply_input(other);
            clock.reschedule(Duration::from_millis(state.speed_ms), Instant::now());
        }
    }
    false
}

fn submit_save(state: &GameState, online: Option<&Online>, notices: &mut NoticeBoard) {
    let Some(online) = online else {
        notices.warn("No store available to save to");
        return;
    };
    let snapshot = state.snapshot();
    let record =
        GameStateRecord::from_snapshot(&online.player_id, &snapshot, state.high_score.best());
    online
        .sync
        .submit(snapshot.episode, SyncCommand::SaveGame(record));
}

fn finish_episode(
    state: &mut GameState,
    online: Option<&Online>,
    recorder: &mut SessionRecorder,
    warnings: &mut Vec<String>,
) {
    let best = state.high_score.best();
    if let Err(error) = save_cached_high_score(best) {
        warnings.push(format!("Failed to cache high score: {error}"));
    }

    let Some(online) = online else {
        return;
    };
    let snapshot = state.snapshot();
    let reason = snapshot.end_reason.unwrap_or(EndReason::Quit);
    if let Some(report) = recorder.take_report(&online.player_id, &snapshot, reason) {
        let record_run = state.high_score.is_record(report.score);
        online
            .sync
            .submit(snapshot.episode, SyncCommand::RecordSession(report));
        online
            .sync
            .submit(snapshot.episode, SyncCommand::FetchStatistics);
        if record_run {
            online
                .sync
                .submit(snapshot.episode, SyncCommand::FetchLeaderboard(10));
        }
    }
}

fn drain_sync_events(
    state: &mut GameState,
    online: Option<&Online>,
    clock: &mut TickClock,
    notices: &mut NoticeBoard,
    warnings: &mut Vec<String>,
    username: &str,
) {
    let Some(online) = online else {
        return;
    };

    while let Some(event) = online.sync.poll() {
        if event.is_stale_for(state.episode()) {
            continue;
        }
        match event.outcome {
            SyncOutcome::Saved => notices.info("Game saved"),
            SyncOutcome::SaveFailed(error) => notices.warn(format!("Save failed: {error}")),
            SyncOutcome::Loaded(record) => match state.restore(&record) {
                Ok(()) => {
                    clock.start(Duration::from_millis(state.speed_ms), Instant::now());
                    notices.info("Game loaded");
                }
                Err(error) => notices.warn(format!("Saved game rejected: {error}")),
            },
            SyncOutcome::LoadFailed(RemoteError::NotFound(_)) => {
                notices.warn("No saved game found");
            }
            SyncOutcome::LoadFailed(error) => notices.warn(format!("Load failed: {error}")),
            SyncOutcome::SaveDeleted => notices.info("Saved game deleted"),
            SyncOutcome::DeleteFailed(error) => notices.warn(format!("Delete failed: {error}")),
            SyncOutcome::SessionRecorded => {}
            // Session recording must never interrupt play; defer the report.
            SyncOutcome::SessionFailed(error) => {
                warnings.push(format!("Failed to record game session: {error}"));
            }
            SyncOutcome::Statistics(stats) => {
                state.high_score.reconcile(stats.highest_score);
                let _ = save_cached_high_score(state.high_score.best());
            }
            SyncOutcome::StatisticsFailed(error) => {
                warnings.push(format!("Failed to fetch statistics: {error}"));
            }
            SyncOutcome::Exported(bundle) => match write_export_file(username, &bundle) {
                Ok(path) => notices.info(format!("Exported to {path}")),
                Err(error) => notices.warn(format!("Export failed: {error}")),
            },
            SyncOutcome::ExportFailed(error) => notices.warn(format!("Export failed: {error}")),
            SyncOutcome::Leaderboard(rows) => {
                if let Some(row) = rows.iter().find(|row| row.username == username) {
                    if let Some(rank) = row.rank {
                        notices.info(format!("Leaderboard: #{rank}"));
                    }
                }
            }
            SyncOutcome::LeaderboardFailed(_) => {}
        }
    }
}

fn write_export_file(username: &str, bundle: &serde_json::Value) -> io::Result<String> {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let path = format!("neon-snake-data-{username}-{millis}.json");

    let json = serde_json::to_string_pretty(bundle)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    std::fs::write(&path, json)?;
    Ok(path)
}
