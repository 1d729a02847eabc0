//! quiz-play - Play timed trivia quizzes in the terminal
//!
//! Reads commands from stdin, one per line, and redraws whenever the
//! visible screen changes.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use libquiz::app::{AppAction, AppState};
use libquiz::config::Config;
use libquiz::db::Database;
use libquiz::environment::Environment;
use libquiz::logging::{self, LogFormat};
use libquiz::store::{self, StoreHandle};
use quiz_play::feedback::TerminalBell;
use quiz_play::input::{is_quit, parse_command};
use quiz_play::render::Renderer;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "quiz-play")]
#[command(version)]
#[command(about = "Play timed trivia quizzes in the terminal")]
#[command(long_about = "\
quiz-play - Play timed trivia quizzes in the terminal

COMMANDS (type one per line):
    <number>   Pick a theme from the list, or toggle an answer option
    c          Check the selected answer
    n          Next question (after checking)
    x          Leave the quiz (asks for confirmation: y/n)
    r          Report the current question as wrong
    q          Quit

CONFIGURATION:
    Configuration file: ~/.config/quiz/config.toml (or $QUIZ_CONFIG)
    Database location: ~/.local/share/quiz/quiz.db

    [quiz]
    question_time = \"10s\"
    tick = \"100ms\"
    correct_answer_points = 50
    finish_delay = \"300ms\"

EXIT CODES:
    0 - Clean exit
    1 - Runtime or configuration error
")]
struct Cli {
    /// Configuration file (overrides QUIZ_CONFIG and the default location)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Log format: text, json or pretty
    #[arg(long, value_name = "FORMAT", env = "QUIZ_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Seed for answer-option shuffling (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Do not ring the terminal bell
    #[arg(long)]
    mute: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logging_config = logging::from_env(cli.verbose);
    if let Some(format) = cli.log_format {
        logging_config.format = format;
    }
    logging_config.init();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load_or_default(),
    }
    .context("Failed to load configuration")?;
    let rules = config.quiz.rules().context("Invalid quiz settings")?;

    let seed = cli.seed.unwrap_or_else(rand::random);
    debug!(seed, database = %config.database.path, "Starting quiz-play");

    let environment = Environment::new(Arc::new(Database::open(&config.database.path)))
        .with_feedback(Arc::new(TerminalBell { muted: cli.mute }));
    let mut handle = store::spawn(AppState::new(rules, seed), environment);
    handle.send(AppAction::Startup)?;

    let result = play(&handle).await;
    handle.shutdown().await;
    info!("quiz-play stopped");
    result
}

/// Input/render loop; returns on `q` or end of input
async fn play(handle: &StoreHandle) -> Result<()> {
    let mut snapshots = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut renderer = Renderer::new(std::io::stdout());

    renderer.render(&handle.state())?;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = snapshots.borrow_and_update().clone();
                renderer.render(&state)?;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                if is_quit(&line) {
                    break;
                }

                let state = handle.state();
                match parse_command(&state, &line) {
                    Some(action) => handle.send(action)?,
                    None => renderer.hint(&state)?,
                }
            }
        }
    }

    Ok(())
}
