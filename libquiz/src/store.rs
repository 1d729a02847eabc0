//! Effect runtime
//!
//! A single tokio task owns the [`AppState`]. It pulls actions off an
//! unbounded queue one at a time, runs the root reducer, publishes the new
//! snapshot on a `watch` channel and then executes the returned effects.
//! Effects never touch state: whatever they produce is sent back through
//! the same queue, behind anything already enqueued.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libquiz::app::{AppAction, AppState, QuizRules};
//! use libquiz::environment::Environment;
//! use libquiz::mock::{sample_topics, MockPersistence};
//! use libquiz::store;
//!
//! # async fn example() -> libquiz::error::Result<()> {
//! let persistence = MockPersistence::with_topics(sample_topics());
//! let handle = store::spawn(
//!     AppState::new(QuizRules::default(), 7),
//!     Environment::new(Arc::new(persistence)),
//! );
//!
//! handle.send(AppAction::Startup)?;
//! let mut snapshots = handle.subscribe();
//! snapshots.changed().await.ok();
//! println!("ready: {}", snapshots.borrow().ready);
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::app::{self, AppAction, AppState, Effect, TimerId};
use crate::engine::Verdict;
use crate::environment::Environment;
use crate::error::{QuizError, Result};

/// Client side of a running store
pub struct StoreHandle {
    actions: mpsc::UnboundedSender<AppAction>,
    snapshots: watch::Receiver<AppState>,
    task: Option<JoinHandle<()>>,
}

impl StoreHandle {
    /// Enqueue an action
    ///
    /// # Errors
    ///
    /// Returns `QuizError::StoreClosed` once the store has shut down.
    pub fn send(&self, action: AppAction) -> Result<()> {
        self.actions.send(action).map_err(|_| QuizError::StoreClosed)
    }

    /// Latest published snapshot
    pub fn state(&self) -> AppState {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every processed action
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.snapshots.clone()
    }

    /// Stop processing and abort all timers
    ///
    /// Effects already in flight may still complete, but their results
    /// are dropped.
    pub async fn shutdown(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
            debug!("Store shut down");
        }
    }
}

impl Drop for StoreHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Start a store on the current tokio runtime
pub fn spawn(state: AppState, environment: Environment) -> StoreHandle {
    let (actions, receiver) = mpsc::unbounded_channel();
    let (publisher, snapshots) = watch::channel(state);

    let runtime = Runtime {
        environment,
        actions: actions.clone(),
        publisher,
        timers: HashMap::new(),
    };
    let task = tokio::spawn(runtime.run(receiver));

    StoreHandle {
        actions,
        snapshots,
        task: Some(task),
    }
}

struct Runtime {
    environment: Environment,
    actions: mpsc::UnboundedSender<AppAction>,

    /// Holds the current state; the only copy
    publisher: watch::Sender<AppState>,

    /// At most one live task per timer id
    timers: HashMap<TimerId, JoinHandle<()>>,
}

impl Runtime {
    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<AppAction>) {
        while let Some(action) = receiver.recv().await {
            self.process(action);
        }
    }

    fn process(&mut self, action: AppAction) {
        debug!(action = %action.label(), "Processing action");

        let current = self.publisher.borrow().clone();
        let (next, effects) = app::reduce(current, action);
        self.publisher.send_replace(next);

        for effect in effects {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect<AppAction>) {
        match effect {
            Effect::Send(action) => self.enqueue(action),

            Effect::Every { id, period, action } => {
                if period.is_zero() {
                    warn!(timer = ?id, "Refusing a repeating timer with a zero period");
                    if let Some(previous) = self.timers.remove(&id) {
                        previous.abort();
                    }
                    return;
                }
                let actions = self.actions.clone();
                let task = tokio::spawn(async move {
                    let mut interval = time::interval_at(Instant::now() + period, period);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    loop {
                        interval.tick().await;
                        if actions.send(action.clone()).is_err() {
                            break;
                        }
                    }
                });
                self.start_timer(id, task);
            }

            Effect::After { id, delay, action } => {
                let actions = self.actions.clone();
                let task = tokio::spawn(async move {
                    time::sleep(delay).await;
                    let _ = actions.send(action);
                });
                self.start_timer(id, task);
            }

            Effect::Cancel(id) => {
                if let Some(task) = self.timers.remove(&id) {
                    task.abort();
                }
            }

            Effect::Migrate { done } => {
                let persistence = self.environment.persistence.clone();
                let actions = self.actions.clone();
                tokio::spawn(async move {
                    if let Err(e) = persistence.migrate().await {
                        warn!(error = %e, "Migration failed; continuing with the existing store");
                    }
                    let _ = actions.send(done);
                });
            }

            Effect::FetchTopics(callback) => {
                let persistence = self.environment.persistence.clone();
                let actions = self.actions.clone();
                tokio::spawn(async move {
                    let topics = persistence.fetch_topics().await.unwrap_or_else(|e| {
                        warn!(error = %e, "Failed to fetch topics");
                        Vec::new()
                    });
                    let _ = actions.send(callback(topics));
                });
            }

            Effect::FetchStats(callback) => {
                let persistence = self.environment.persistence.clone();
                let actions = self.actions.clone();
                tokio::spawn(async move {
                    let stats = persistence.fetch_stats().await.unwrap_or_else(|e| {
                        warn!(error = %e, "Failed to fetch stats");
                        None
                    });
                    let _ = actions.send(callback(stats));
                });
            }

            Effect::RecordRound { round, done } => {
                let persistence = self.environment.persistence.clone();
                let actions = self.actions.clone();
                tokio::spawn(async move {
                    match persistence.record_round(&round).await {
                        Ok(()) => {
                            let _ = actions.send(done);
                        }
                        Err(e) => warn!(error = %e, theme_id = round.theme_id, "Failed to record round"),
                    }
                });
            }

            Effect::ReportComplaint(question_id) => {
                let persistence = self.environment.persistence.clone();
                tokio::spawn(async move {
                    if let Err(e) = persistence.record_complaint(question_id).await {
                        warn!(error = %e, question_id, "Failed to record complaint");
                    }
                });
            }

            Effect::ReportPerfectCompletion => {
                self.environment.achievements.report_perfect_completion();
            }

            Effect::Feedback(verdict) => match verdict {
                Verdict::Correct => self.environment.feedback.play_correct(),
                Verdict::Incorrect => self.environment.feedback.play_incorrect(),
            },
        }
    }

    fn enqueue(&self, action: AppAction) {
        // The receiver lives as long as this runtime.
        let _ = self.actions.send(action);
    }

    fn start_timer(&mut self, id: TimerId, task: JoinHandle<()>) {
        if let Some(previous) = self.timers.insert(id, task) {
            previous.abort();
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        for (_, task) in self.timers.drain() {
            task.abort();
        }
    }
}
