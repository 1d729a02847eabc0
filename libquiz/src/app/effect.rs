//! Effects returned by reducers
//!
//! Reducers never perform I/O. They describe what should happen next as a
//! list of [`Effect`] values; the store (see `store.rs`) executes them and
//! feeds any resulting action back into the queue.

use std::fmt;
use std::time::Duration;

use crate::engine::Verdict;
use crate::types::{Round, Stats, Topic};

/// Stable identity of a long-lived timer
///
/// At most one timer per id is live: starting one replaces its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// Per-question countdown of the active session
    Countdown,
    /// Teardown of a finished session after its exit transition
    Dismiss,
}

/// Continuation turning a fetch result into an action
pub type Callback<T, A> = Box<dyn FnOnce(T) -> A + Send>;

/// List of effects produced by one reducer step
pub type Effects<A> = Vec<Effect<A>>;

pub enum Effect<A> {
    /// Enqueue an action right away
    Send(A),

    /// Enqueue `action` every `period` until cancelled
    Every {
        id: TimerId,
        period: Duration,
        action: A,
    },

    /// Enqueue `action` once after `delay` unless cancelled first
    After {
        id: TimerId,
        delay: Duration,
        action: A,
    },

    /// Stop the timer with this id, if any
    Cancel(TimerId),

    /// Run schema migration, then enqueue `done` whatever the outcome
    Migrate { done: A },

    /// Load all topics; failures yield an empty list
    FetchTopics(Callback<Vec<Topic>, A>),

    /// Load play statistics; failures yield `None`
    FetchStats(Callback<Option<Stats>, A>),

    /// Persist a finished round, then enqueue `done` on success
    RecordRound { round: Round, done: A },

    /// Persist a "this question is wrong" report
    ReportComplaint(i64),

    /// Notify the achievement service of a flawless session
    ReportPerfectCompletion,

    /// Play success/failure feedback for a committed answer
    Feedback(Verdict),
}

impl<A: 'static> Effect<A> {
    /// Lift a child effect into the parent's action space
    pub fn map<B: 'static>(self, f: fn(A) -> B) -> Effect<B> {
        match self {
            Effect::Send(action) => Effect::Send(f(action)),
            Effect::Every { id, period, action } => Effect::Every {
                id,
                period,
                action: f(action),
            },
            Effect::After { id, delay, action } => Effect::After {
                id,
                delay,
                action: f(action),
            },
            Effect::Cancel(id) => Effect::Cancel(id),
            Effect::Migrate { done } => Effect::Migrate { done: f(done) },
            Effect::FetchTopics(k) => Effect::FetchTopics(Box::new(move |topics| f(k(topics)))),
            Effect::FetchStats(k) => Effect::FetchStats(Box::new(move |stats| f(k(stats)))),
            Effect::RecordRound { round, done } => Effect::RecordRound {
                round,
                done: f(done),
            },
            Effect::ReportComplaint(question_id) => Effect::ReportComplaint(question_id),
            Effect::ReportPerfectCompletion => Effect::ReportPerfectCompletion,
            Effect::Feedback(verdict) => Effect::Feedback(verdict),
        }
    }
}

/// Lift a whole effect list, see [`Effect::map`]
pub fn lift<A: 'static, B: 'static>(effects: Effects<A>, f: fn(A) -> B) -> Effects<B> {
    effects.into_iter().map(|effect| effect.map(f)).collect()
}

impl<A: fmt::Debug> fmt::Debug for Effect<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Send(action) => f.debug_tuple("Send").field(action).finish(),
            Effect::Every { id, period, action } => f
                .debug_struct("Every")
                .field("id", id)
                .field("period", period)
                .field("action", action)
                .finish(),
            Effect::After { id, delay, action } => f
                .debug_struct("After")
                .field("id", id)
                .field("delay", delay)
                .field("action", action)
                .finish(),
            Effect::Cancel(id) => f.debug_tuple("Cancel").field(id).finish(),
            Effect::Migrate { done } => f.debug_struct("Migrate").field("done", done).finish(),
            Effect::FetchTopics(_) => f.write_str("FetchTopics(..)"),
            Effect::FetchStats(_) => f.write_str("FetchStats(..)"),
            Effect::RecordRound { round, done } => f
                .debug_struct("RecordRound")
                .field("round", round)
                .field("done", done)
                .finish(),
            Effect::ReportComplaint(id) => f.debug_tuple("ReportComplaint").field(id).finish(),
            Effect::ReportPerfectCompletion => f.write_str("ReportPerfectCompletion"),
            Effect::Feedback(verdict) => f.debug_tuple("Feedback").field(verdict).finish(),
        }
    }
}
