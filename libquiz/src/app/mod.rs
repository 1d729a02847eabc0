//! Quiz state machines
//!
//! Four reducers nest top-down: root → topics → session → question. Each is
//! a pure `reduce(state, action) -> (state, effects)`; a parent owns its
//! child's state as a field, forwards the child's slice of its action type
//! and lifts the returned effects with [`effect::Effect::map`].

use std::time::Duration;

use crate::error::{ConfigError, QuizError, Result};

pub mod effect;
pub mod question;
pub mod results;
pub mod root;
pub mod session;
pub mod topics;

pub use effect::{Effect, Effects, TimerId};
pub use question::{QuestionAction, QuestionState};
pub use results::{Grade, QuizResults};
pub use root::{reduce, AppAction, AppState};
pub use session::{QuizSessionState, SessionAction, SessionPhase};
pub use topics::{TopicsAction, TopicsState};

/// Timing and scoring rules of a session
///
/// Defaults come from [`crate::config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizRules {
    /// Per-question countdown budget
    pub question_time: Duration,

    /// Countdown quantum
    pub tick: Duration,

    /// Points for each correct answer
    pub correct_answer_points: u32,

    /// How long a finished session stays up before it is dismissed
    pub finish_delay: Duration,
}

impl QuizRules {
    /// Rules with the same checks the config loader applies
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when a duration the countdown runs on
    /// is zero, or when `tick` is longer than `question_time`.
    pub fn new(
        question_time: Duration,
        tick: Duration,
        correct_answer_points: u32,
        finish_delay: Duration,
    ) -> Result<Self> {
        for (field, value) in [("quiz.question_time", question_time), ("quiz.tick", tick)] {
            if value.is_zero() {
                return Err(invalid(field, "must be greater than zero"));
            }
        }
        if tick > question_time {
            return Err(invalid("quiz.tick", "must not exceed quiz.question_time"));
        }

        Ok(Self {
            question_time,
            tick,
            correct_answer_points,
            finish_delay,
        })
    }
}

fn invalid(field: &str, reason: &str) -> QuizError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
