//! Collaborators the store talks to
//!
//! The state machines never call these directly. The store executes
//! effects against an [`Environment`], which bundles one implementation of
//! each trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;
use crate::types::{Round, Stats, Topic};

/// Content and history storage
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Create or update the schema; safe to call repeatedly
    async fn migrate(&self) -> Result<()>;

    /// All topics with their themes, questions and options, in display order
    async fn fetch_topics(&self) -> Result<Vec<Topic>>;

    /// Accumulated play time, `None` when nothing was ever played
    async fn fetch_stats(&self) -> Result<Option<Stats>>;

    async fn record_round(&self, round: &Round) -> Result<()>;

    /// Store a report that a question is wrong
    async fn record_complaint(&self, question_id: i64) -> Result<()>;
}

/// Achievement/social service, fire-and-forget
pub trait Achievements: Send + Sync {
    fn report_perfect_completion(&self);
}

/// Success/failure acknowledgment for committed answers
pub trait Feedback: Send + Sync {
    fn play_correct(&self);
    fn play_incorrect(&self);
}

#[derive(Clone)]
pub struct Environment {
    pub persistence: Arc<dyn Persistence>,
    pub achievements: Arc<dyn Achievements>,
    pub feedback: Arc<dyn Feedback>,
}

impl Environment {
    /// Environment with logging achievements and silent feedback
    pub fn new(persistence: Arc<dyn Persistence>) -> Self {
        Self {
            persistence,
            achievements: Arc::new(LoggingAchievements),
            feedback: Arc::new(SilentFeedback),
        }
    }

    pub fn with_achievements(mut self, achievements: Arc<dyn Achievements>) -> Self {
        self.achievements = achievements;
        self
    }

    pub fn with_feedback(mut self, feedback: Arc<dyn Feedback>) -> Self {
        self.feedback = feedback;
        self
    }
}

/// Achievements that only leave a log line
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingAchievements;

impl Achievements for LoggingAchievements {
    fn report_perfect_completion(&self) {
        info!("Perfect completion: every question answered correctly");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentFeedback;

impl Feedback for SilentFeedback {
    fn play_correct(&self) {}
    fn play_incorrect(&self) {}
}
