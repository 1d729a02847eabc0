//! App root
//!
//! Runs the one-time startup migration, then keeps one [`TopicsState`] for
//! the lifetime of the app. Stats are refreshed after startup and after
//! every recorded round.

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::effect::{lift, Callback, Effect, Effects};
use super::question::QuestionAction;
use super::session::SessionAction;
use super::topics::{self, TopicsAction, TopicsState};
use super::QuizRules;
use crate::types::Stats;

#[derive(Debug, Clone)]
pub struct AppState {
    /// Startup was dispatched
    pub launched: bool,

    /// Migration finished (successfully or not)
    pub ready: bool,

    pub stats: Option<Stats>,
    pub topics: TopicsState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Startup,
    MigrationFinished,
    StatsLoaded(Option<Stats>),
    Topics(TopicsAction),
}

impl AppAction {
    /// Shorthand for an action routed down to the current question
    pub fn question(action: QuestionAction) -> Self {
        Self::session(SessionAction::Question(action))
    }

    /// Shorthand for an action routed down to the active session
    pub fn session(action: SessionAction) -> Self {
        AppAction::Topics(TopicsAction::Session(action))
    }

    /// Variant path used in logs, e.g. `topics.session.question.commit`
    pub fn label(&self) -> String {
        match self {
            AppAction::Startup => "startup".to_string(),
            AppAction::MigrationFinished => "migration_finished".to_string(),
            AppAction::StatsLoaded(_) => "stats_loaded".to_string(),
            AppAction::Topics(action) => format!("topics.{}", action.label()),
        }
    }
}

impl AppState {
    /// Fresh app state; `seed` drives every option shuffle of the run
    pub fn new(rules: QuizRules, seed: u64) -> Self {
        Self {
            launched: false,
            ready: false,
            stats: None,
            topics: TopicsState::new(rules, StdRng::seed_from_u64(seed)),
        }
    }
}

/// Root reducer
pub fn reduce(mut state: AppState, action: AppAction) -> (AppState, Effects<AppAction>) {
    match action {
        AppAction::Startup => {
            if state.launched {
                return (state, Vec::new());
            }
            state.launched = true;
            (
                state,
                vec![Effect::Migrate {
                    done: AppAction::MigrationFinished,
                }],
            )
        }

        AppAction::MigrationFinished => {
            if state.ready {
                return (state, Vec::new());
            }
            state.ready = true;
            (
                state,
                vec![
                    fetch_stats(),
                    Effect::Send(AppAction::Topics(TopicsAction::Enter)),
                ],
            )
        }

        AppAction::StatsLoaded(stats) => {
            state.stats = stats;
            (state, Vec::new())
        }

        AppAction::Topics(action) => {
            let recorded = action == TopicsAction::RoundRecorded;

            let (topics, effects) = topics::reduce(state.topics, action);
            state.topics = topics;
            let mut effects = lift(effects, AppAction::Topics);

            if recorded {
                effects.push(fetch_stats());
            }
            (state, effects)
        }
    }
}

fn fetch_stats() -> Effect<AppAction> {
    let loaded: Callback<Option<Stats>, AppAction> = Box::new(AppAction::StatsLoaded);
    Effect::FetchStats(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(QuizRules::default(), 11)
    }

    #[test]
    fn test_startup_migrates_once() {
        let (state, effects) = reduce(state(), AppAction::Startup);
        assert!(state.launched);
        assert!(matches!(
            effects[..],
            [Effect::Migrate {
                done: AppAction::MigrationFinished
            }]
        ));

        let (_, effects) = reduce(state, AppAction::Startup);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_migration_finished_loads_stats_and_topics() {
        let (state, _) = reduce(state(), AppAction::Startup);
        let (state, effects) = reduce(state, AppAction::MigrationFinished);

        assert!(state.ready);
        assert_eq!(effects.len(), 2);
        match &effects[0] {
            Effect::FetchStats(_) => {}
            other => panic!("unexpected effect {:?}", other),
        }
        assert!(matches!(
            effects[1],
            Effect::Send(AppAction::Topics(TopicsAction::Enter))
        ));
    }

    #[test]
    fn test_stats_callback_builds_action() {
        match fetch_stats() {
            Effect::FetchStats(k) => {
                let stats = Stats { seconds_played: 90 };
                assert_eq!(k(Some(stats)), AppAction::StatsLoaded(Some(stats)));
            }
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[test]
    fn test_round_recorded_refreshes_stats() {
        let (_, effects) = reduce(state(), AppAction::Topics(TopicsAction::RoundRecorded));
        assert!(matches!(effects[..], [Effect::FetchStats(_)]));
    }

    #[test]
    fn test_topic_effects_are_lifted() {
        let (_, effects) = reduce(state(), AppAction::Topics(TopicsAction::Enter));
        match effects.into_iter().next() {
            Some(Effect::FetchTopics(k)) => {
                assert_eq!(
                    k(Vec::new()),
                    AppAction::Topics(TopicsAction::Loaded(Vec::new()))
                );
            }
            other => panic!("unexpected effect {:?}", other),
        }
    }

    #[test]
    fn test_action_label_is_variant_path() {
        assert_eq!(
            AppAction::question(QuestionAction::Commit).label(),
            "topics.session.question.commit"
        );
        assert_eq!(AppAction::Startup.label(), "startup");
    }
}
