//! quiz-import - Load quiz content into the quiz database
//!
//! Replaces the topics, themes, questions and options tables with the
//! contents of a JSON document. Play history is left alone.

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use libquiz::config::Config;
use libquiz::db::Database;
use libquiz::logging;
use libquiz::QuizError;
use tracing::{info, warn};

mod document;

#[derive(Parser, Debug)]
#[command(name = "quiz-import")]
#[command(version)]
#[command(about = "Load quiz topics, themes and questions into the quiz database")]
#[command(long_about = "\
quiz-import - Load quiz content into the quiz database

DESCRIPTION:
    Reads a JSON array of topics (each with themes, questions and options)
    and replaces all quiz content in the database with it, in a single
    transaction. Recorded rounds and question reports are kept.

USAGE:
    quiz-import data/sample_topics.json
    quiz-import --check content.json
    quiz-import --database /tmp/quiz.db content.json

EXIT CODES:
    0 - Success
    1 - Database or configuration error
    3 - Invalid document
")]
struct Cli {
    /// JSON document to import
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Database file (overrides the configured path)
    #[arg(long, value_name = "PATH")]
    database: Option<String>,

    /// Configuration file (overrides QUIZ_CONFIG and the default location)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Validate the document without touching the database
    #[arg(long)]
    check: bool,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::from_env(cli.verbose).init();

    let topics = match document::load(&cli.file).and_then(|topics| {
        document::check(&topics).map(|warnings| (topics, warnings))
    }) {
        Ok((topics, warnings)) => {
            for warning in &warnings {
                warn!("{}", warning);
            }
            topics
        }
        Err(e) => exit_with(e),
    };

    if cli.check {
        println!("{}: {} topics OK", cli.file.display(), topics.len());
        return Ok(());
    }

    let db_path = match cli.database {
        Some(path) => path,
        None => {
            let config = match &cli.config {
                Some(path) => Config::load_from_path(path),
                None => Config::load_or_default(),
            }
            .context("Failed to load configuration")?;
            config.database.path
        }
    };

    let db = Database::new(&db_path)
        .await
        .context("Failed to initialize database")?;
    let summary = db
        .import_topics(&topics)
        .await
        .context("Failed to import topics")?;

    info!(path = %db.path().display(), "Import finished");
    println!(
        "Imported {} topics, {} themes, {} questions, {} options",
        summary.topics, summary.themes, summary.questions, summary.options
    );
    Ok(())
}

fn exit_with(error: QuizError) -> ! {
    eprintln!("Error: {}", error);
    process::exit(error.exit_code());
}
