//! In-memory collaborators for tests and demos
//!
//! Every mock records what it was asked to do so tests can assert on the
//! side effects the store executed.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::environment::{Achievements, Environment, Feedback, Persistence};
use crate::error::{DbError, Result};
use crate::types::{AnswerOption, Difficulty, Question, Round, Stats, Theme, Topic};

/// Persistence kept in memory
///
/// Stats are derived from the recorded rounds, like the SQLite store does.
#[derive(Debug, Clone, Default)]
pub struct MockPersistence {
    /// Topics returned by `fetch_topics`
    pub topics: Vec<Topic>,

    /// When set, every call fails with an I/O error
    pub fails: bool,

    pub migrate_calls: Arc<Mutex<usize>>,
    pub rounds: Arc<Mutex<Vec<Round>>>,
    pub complaints: Arc<Mutex<Vec<i64>>>,
}

impl MockPersistence {
    pub fn with_topics(topics: Vec<Topic>) -> Self {
        Self {
            topics,
            ..Default::default()
        }
    }

    /// Persistence whose every call fails
    pub fn failing() -> Self {
        Self {
            fails: true,
            ..Default::default()
        }
    }

    pub fn migrate_count(&self) -> usize {
        self.migrate_calls.lock().map(|c| *c).unwrap_or(0)
    }

    pub fn recorded_rounds(&self) -> Vec<Round> {
        self.rounds.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn recorded_complaints(&self) -> Vec<i64> {
        self.complaints.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn check(&self) -> Result<()> {
        if self.fails {
            return Err(DbError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                "mock persistence failure",
            ))
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl Persistence for MockPersistence {
    async fn migrate(&self) -> Result<()> {
        if let Ok(mut calls) = self.migrate_calls.lock() {
            *calls += 1;
        }
        self.check()
    }

    async fn fetch_topics(&self) -> Result<Vec<Topic>> {
        self.check()?;
        Ok(self.topics.clone())
    }

    async fn fetch_stats(&self) -> Result<Option<Stats>> {
        self.check()?;
        let rounds = self.recorded_rounds();
        if rounds.is_empty() {
            return Ok(None);
        }
        Ok(Some(Stats {
            seconds_played: rounds.iter().map(|r| r.seconds_played).sum(),
        }))
    }

    async fn record_round(&self, round: &Round) -> Result<()> {
        self.check()?;
        if let Ok(mut rounds) = self.rounds.lock() {
            rounds.push(round.clone());
        }
        Ok(())
    }

    async fn record_complaint(&self, question_id: i64) -> Result<()> {
        self.check()?;
        if let Ok(mut complaints) = self.complaints.lock() {
            complaints.push(question_id);
        }
        Ok(())
    }
}

/// Counts perfect completions
#[derive(Debug, Clone, Default)]
pub struct RecordingAchievements {
    pub reports: Arc<Mutex<usize>>,
}

impl RecordingAchievements {
    pub fn count(&self) -> usize {
        self.reports.lock().map(|c| *c).unwrap_or(0)
    }
}

impl Achievements for RecordingAchievements {
    fn report_perfect_completion(&self) {
        if let Ok(mut reports) = self.reports.lock() {
            *reports += 1;
        }
    }
}

/// Records played feedback in order, `true` for correct
#[derive(Debug, Clone, Default)]
pub struct RecordingFeedback {
    pub played: Arc<Mutex<Vec<bool>>>,
}

impl RecordingFeedback {
    pub fn played(&self) -> Vec<bool> {
        self.played.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn push(&self, correct: bool) {
        if let Ok(mut played) = self.played.lock() {
            played.push(correct);
        }
    }
}

impl Feedback for RecordingFeedback {
    fn play_correct(&self) {
        self.push(true);
    }

    fn play_incorrect(&self) {
        self.push(false);
    }
}

/// Mock collaborators plus the environment wired to them
#[derive(Clone)]
pub struct MockEnvironment {
    pub persistence: MockPersistence,
    pub achievements: RecordingAchievements,
    pub feedback: RecordingFeedback,
}

impl MockEnvironment {
    pub fn new(persistence: MockPersistence) -> Self {
        Self {
            persistence,
            achievements: RecordingAchievements::default(),
            feedback: RecordingFeedback::default(),
        }
    }

    pub fn environment(&self) -> Environment {
        Environment::new(Arc::new(self.persistence.clone()))
            .with_achievements(Arc::new(self.achievements.clone()))
            .with_feedback(Arc::new(self.feedback.clone()))
    }
}

/// Small fixed content set: one topic, two themes, one of them empty
///
/// "Planets" has two questions. The first is single-answer with the
/// correct option first; the second is multi-answer with options 0 and 2
/// correct.
pub fn sample_topics() -> Vec<Topic> {
    fn option(id: i64, question_id: i64, text: &str, is_correct: bool) -> AnswerOption {
        AnswerOption {
            id,
            question_id,
            text: Some(text.to_string()),
            image: None,
            is_correct,
        }
    }

    let planets = Theme {
        id: 1,
        title: "Planets".to_string(),
        image: Some("planets.png".to_string()),
        questions: vec![
            Question {
                id: 1,
                title: "Which planet is closest to the Sun?".to_string(),
                description: None,
                reference: None,
                difficulty: Difficulty::Easy,
                options: vec![
                    option(1, 1, "Mercury", true),
                    option(2, 1, "Venus", false),
                    option(3, 1, "Mars", false),
                    option(4, 1, "Jupiter", false),
                ],
            },
            Question {
                id: 2,
                title: "Which planets have no moons?".to_string(),
                description: Some("Select every correct answer.".to_string()),
                reference: None,
                difficulty: Difficulty::Medium,
                options: vec![
                    option(5, 2, "Mercury", true),
                    option(6, 2, "Earth", false),
                    option(7, 2, "Venus", true),
                    option(8, 2, "Mars", false),
                ],
            },
        ],
    };

    let empty = Theme {
        id: 2,
        title: "Coming soon".to_string(),
        image: None,
        questions: Vec::new(),
    };

    vec![Topic {
        id: 1,
        title: "Space".to_string(),
        themes: vec![planets, empty],
    }]
}
