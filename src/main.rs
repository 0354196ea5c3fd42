use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use env_logger::Target;
use log::info;
use snake_engine::config::{ConfigError, EngineConfig, THEMES};
use snake_engine::engine::GameCore;
use snake_engine::input::{GameInput, InputHandler};
use snake_engine::protocol::{encode_reply, handle_line};
use snake_engine::renderer::HudInfo;
use snake_engine::score::{HighScoreStore, HighScoreTracker, SharedHighScore, default_scores_path};
use snake_engine::session::{Command, Pace, Session};
use snake_engine::snapshot::Snapshot;
use snake_engine::terminal_runtime::TerminalSession;

/// Input poll timeout, which also caps the redraw rate.
const FRAME_POLL: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(version, about = "Classic Snake on a tick-based simulation engine")]
struct Cli {
    /// JSON file overriding the default game rules.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for food placement, for reproducible rounds.
    #[arg(long)]
    seed: Option<u64>,

    /// High score file (defaults to the platform data directory).
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Write log output to this file. Interactive mode logs nowhere without it.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Read JSON commands from stdin and answer on stdout instead of drawing.
    #[arg(long)]
    headless: bool,
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    if let Some(target) = log_target(cli.headless, cli.log_file.as_deref())? {
        env_logger::Builder::from_default_env().target(target).init();
    }

    let config = load_config(cli.config.as_deref())?;
    let core = match cli.seed {
        Some(seed) => GameCore::with_seed(config, seed),
        None => GameCore::new(config),
    }
    .map_err(invalid_config)?;

    let store = HighScoreStore::new(cli.scores.unwrap_or_else(default_scores_path));
    info!("high score file: {}", store.path().display());
    let tracker = SharedHighScore::new(HighScoreTracker::load(store));

    let observer = tracker.clone();
    let session = Session::spawn_observed(core, Pace::Advisory, move |frame| {
        observer.observe(frame);
    });

    if cli.headless {
        run_headless(session)
    } else {
        run_interactive(session, &tracker)
    }
}

/// Where log output goes. Stderr would draw over the terminal UI, so the
/// interactive front-end only logs to an explicit file.
fn log_target(headless: bool, log_file: Option<&Path>) -> io::Result<Option<Target>> {
    if let Some(path) = log_file {
        return Ok(Some(Target::Pipe(Box::new(File::create(path)?))));
    }
    Ok(headless.then_some(Target::Stderr))
}

fn load_config(path: Option<&Path>) -> io::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_path(path).map_err(invalid_config),
        None => Ok(EngineConfig::default()),
    }
}

fn invalid_config(error: ConfigError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, error)
}

fn run_interactive(session: Session, tracker: &SharedHighScore) -> io::Result<()> {
    let mut terminal = TerminalSession::enter()?;
    let mut input = InputHandler::new(FRAME_POLL);
    let mut theme_index = 0;

    loop {
        let snapshot = latest(&session)?;

        terminal.draw(
            &snapshot,
            &HudInfo {
                high_score: tracker.best(),
                theme: &THEMES[theme_index],
            },
        )?;

        match input.poll_input()? {
            Some(GameInput::Quit) => break,
            Some(GameInput::Direction(direction)) => send(&session, Command::Turn(direction))?,
            Some(GameInput::Restart) if snapshot.game_over => send(&session, Command::Restart)?,
            Some(GameInput::NextTheme) => theme_index = (theme_index + 1) % THEMES.len(),
            Some(GameInput::Restart) | None => {}
        }
    }

    session.shutdown();
    Ok(())
}

fn run_headless(session: Session) -> io::Result<()> {
    let mut stdout = io::stdout().lock();

    for line in io::stdin().lock().lines() {
        let line = line?;
        let Some(reply) = handle_line(&session, &line).map_err(io::Error::other)? else {
            break;
        };

        let encoded = encode_reply(&reply).map_err(io::Error::other)?;
        writeln!(stdout, "{encoded}")?;
        stdout.flush()?;
    }

    session.shutdown();
    Ok(())
}

fn latest(session: &Session) -> io::Result<Arc<Snapshot>> {
    session
        .latest()
        .ok_or_else(|| io::Error::other("session has not published a frame"))
}

fn send(session: &Session, command: Command) -> io::Result<()> {
    session.send(command).map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use env_logger::Target;

    use super::log_target;

    #[test]
    fn interactive_mode_without_a_file_does_not_log() {
        assert!(log_target(false, None).expect("no file to open").is_none());
    }

    #[test]
    fn headless_mode_logs_to_stderr() {
        assert!(matches!(
            log_target(true, None).expect("no file to open"),
            Some(Target::Stderr)
        ));
    }

    #[test]
    fn log_file_wins_in_either_mode() {
        let path = std::env::temp_dir().join(format!("snake-engine-log-{}.log", std::process::id()));

        let target = log_target(false, Some(&path)).expect("log file is creatable");

        assert!(matches!(target, Some(Target::Pipe(_))));
        assert!(path.exists());
        let _ = fs::remove_file(&path);
    }
}
