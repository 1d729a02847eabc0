//! Quiz - timed trivia sessions driven by composable state machines
//!
//! This library provides the quiz core: content types, answer evaluation,
//! the root → topics → session → question reducers, the effect runtime
//! that executes their effects, and SQLite persistence.

pub mod app;
pub mod config;
pub mod db;
pub mod engine;
pub mod environment;
pub mod error;
pub mod logging;
pub mod mock;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use app::{AppAction, AppState, QuizRules};
pub use config::Config;
pub use db::{Database, ImportSummary};
pub use engine::{evaluate, Verdict};
pub use environment::{Environment, Persistence};
pub use error::{QuizError, Result};
pub use store::StoreHandle;
pub use types::{AnswerOption, Difficulty, Question, Round, Stats, Theme, Topic};
