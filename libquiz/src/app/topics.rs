//! Topics and navigation
//!
//! Holds the fetched topic list and at most one active quiz session.
//! A finished session stays on screen for `finish_delay` before it is torn
//! down, so its exit transition is never cut short.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::effect::{lift, Callback, Effect, Effects, TimerId};
use super::results::QuizResults;
use super::session::{self, QuizSessionState, SessionAction};
use super::QuizRules;
use crate::types::{Theme, Topic};

#[derive(Debug, Clone)]
pub struct TopicsState {
    pub topics: Arc<Vec<Topic>>,

    /// A fetch completed (possibly with an empty list)
    pub loaded: bool,

    pub selected_theme: Option<Arc<Theme>>,
    pub session: Option<QuizSessionState>,

    /// Results of the most recently finished session
    pub last_results: Option<QuizResults>,

    /// A finished session is waiting for its dismiss timer
    pub dismiss_pending: bool,

    pub rules: QuizRules,

    rng: StdRng,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicsAction {
    Enter,
    Loaded(Vec<Topic>),
    SelectTheme(Theme),
    Session(SessionAction),
    /// Finish delay elapsed; drop the session
    Dismiss,
    RoundRecorded,
}

impl TopicsAction {
    pub fn label(&self) -> String {
        match self {
            TopicsAction::Enter => "enter".to_string(),
            TopicsAction::Loaded(_) => "loaded".to_string(),
            TopicsAction::SelectTheme(_) => "select_theme".to_string(),
            TopicsAction::Session(action) => format!("session.{}", action.label()),
            TopicsAction::Dismiss => "dismiss".to_string(),
            TopicsAction::RoundRecorded => "round_recorded".to_string(),
        }
    }
}

impl TopicsState {
    pub fn new(rules: QuizRules, rng: StdRng) -> Self {
        Self {
            topics: Arc::new(Vec::new()),
            loaded: false,
            selected_theme: None,
            session: None,
            last_results: None,
            dismiss_pending: false,
            rules,
            rng,
        }
    }

    /// No theme selected, no session on screen
    pub fn is_idle(&self) -> bool {
        self.session.is_none()
    }

    /// Themes of all topics, flattened in display order
    pub fn themes(&self) -> impl Iterator<Item = (&Topic, &Theme)> {
        self.topics
            .iter()
            .flat_map(|topic| topic.themes.iter().map(move |theme| (topic, theme)))
    }
}

/// Topics reducer
pub fn reduce(mut state: TopicsState, action: TopicsAction) -> (TopicsState, Effects<TopicsAction>) {
    match action {
        TopicsAction::Enter => {
            let loaded: Callback<Vec<Topic>, TopicsAction> = Box::new(TopicsAction::Loaded);
            (state, vec![Effect::FetchTopics(loaded)])
        }

        TopicsAction::Loaded(topics) => {
            state.topics = Arc::new(topics);
            state.loaded = true;
            (state, Vec::new())
        }

        TopicsAction::SelectTheme(theme) => {
            if state.session.is_some() {
                return (state, Vec::new());
            }

            let theme = Arc::new(theme);
            let rng = StdRng::seed_from_u64(state.rng.gen());
            let Some(session) = QuizSessionState::new(Arc::clone(&theme), state.rules, rng) else {
                return (state, Vec::new());
            };

            state.selected_theme = Some(theme);
            state.session = Some(session);
            state.last_results = None;
            (
                state,
                vec![Effect::Send(TopicsAction::Session(SessionAction::Start))],
            )
        }

        TopicsAction::Session(SessionAction::Finished) => session_finished(state),

        TopicsAction::Session(action) => {
            let Some(session) = state.session.take() else {
                return (state, Vec::new());
            };
            let (session, effects) = session::reduce(session, action);
            state.session = Some(session);
            (state, lift(effects, TopicsAction::Session))
        }

        TopicsAction::Dismiss => {
            state.session = None;
            state.selected_theme = None;
            state.dismiss_pending = false;
            (state, Vec::new())
        }

        // Root refreshes stats; nothing to do here.
        TopicsAction::RoundRecorded => (state, Vec::new()),
    }
}

fn session_finished(mut state: TopicsState) -> (TopicsState, Effects<TopicsAction>) {
    let Some(session) = state.session.as_ref() else {
        return (state, Vec::new());
    };
    if !session.is_finished() || state.dismiss_pending {
        return (state, Vec::new());
    }

    let mut effects = Vec::new();
    if session.is_perfect() {
        effects.push(Effect::ReportPerfectCompletion);
    }

    let round = session.round();
    if !round.answers.is_empty() || round.seconds_played > 0 {
        effects.push(Effect::RecordRound {
            round,
            done: TopicsAction::RoundRecorded,
        });
    }

    state.last_results = Some(session.results());
    state.dismiss_pending = true;
    effects.push(Effect::After {
        id: TimerId::Dismiss,
        delay: state.rules.finish_delay,
        action: TopicsAction::Dismiss,
    });
    (state, effects)
}
