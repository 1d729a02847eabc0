//! Core quiz content types
//!
//! Content is created by the persistence layer (or an import file) and is
//! read-only afterwards: nothing in the state machines edits it.

use serde::{Deserialize, Serialize};

/// One answer choice of a question
///
/// At least one of `text` / `image` is expected to be set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: i64,
    pub question_id: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub is_correct: bool,
}

impl AnswerOption {
    /// Display label: the text, falling back to the image reference
    pub fn label(&self) -> &str {
        self.text
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.image.as_deref())
            .unwrap_or("")
    }
}

/// Question difficulty, stored as level 1..=3
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn level(self) -> i64 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    /// Out-of-range levels clamp to the nearest difficulty
    pub fn from_level(level: i64) -> Self {
        match level {
            i64::MIN..=1 => Difficulty::Easy,
            2 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Display order, fixed per question
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn correct_options(&self) -> impl Iterator<Item = &AnswerOption> {
        self.options.iter().filter(|o| o.is_correct)
    }

    pub fn has_correct_answer(&self) -> bool {
        self.options.iter().any(|o| o.is_correct)
    }

    /// Multi-select questions have more than one correct option
    pub fn has_multiple_correct_answers(&self) -> bool {
        self.correct_options().count() > 1
    }

    /// Human-readable correct answer, e.g. "Mercury, Venus"
    pub fn correct_answer_description(&self) -> String {
        self.correct_options()
            .map(AnswerOption::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// An ordered quiz under a topic
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Theme {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    pub questions: Vec<Question>,
}

/// A named grouping of themes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub title: String,
    pub themes: Vec<Theme>,
}

/// Accumulated play statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub seconds_played: i64,
}

/// A finished (or abandoned) session, as persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub theme_id: i64,
    pub seconds_played: i64,
    /// One entry per answered question, `true` when correct
    pub answers: Vec<bool>,
}
