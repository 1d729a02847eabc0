//! Full sessions driven through the root reducer
//!
//! No runtime here: effects are inspected directly and the ones that
//! matter (fetch results, finish notifications) are fed back by hand.

use libquiz::app::{
    reduce, AppAction, AppState, Effect, Effects, QuestionAction, QuizRules, SessionAction,
    SessionPhase, TopicsAction,
};
use libquiz::mock::sample_topics;
use libquiz::{Theme, Verdict};

fn planets() -> Theme {
    sample_topics()[0].themes[0].clone()
}

fn ready_state() -> AppState {
    let state = AppState::new(QuizRules::default(), 5);
    let (state, _) = reduce(state, AppAction::Startup);
    let (state, _) = reduce(state, AppAction::MigrationFinished);
    let (state, _) = reduce(
        state,
        AppAction::Topics(TopicsAction::Loaded(sample_topics())),
    );
    state
}

/// Apply actions in order, keeping only the last step's effects
fn run(state: AppState, actions: Vec<AppAction>) -> (AppState, Effects<AppAction>) {
    actions
        .into_iter()
        .fold((state, Vec::new()), |(state, _), action| reduce(state, action))
}

fn toggle(index: usize) -> AppAction {
    AppAction::question(QuestionAction::Toggle(index))
}

fn commit() -> AppAction {
    AppAction::question(QuestionAction::Commit)
}

fn next() -> AppAction {
    AppAction::question(QuestionAction::Continue)
}

#[test]
fn test_boot_sequence_marks_ready_and_loaded() {
    let state = ready_state();
    assert!(state.launched);
    assert!(state.ready);
    assert!(state.topics.loaded);
    assert_eq!(state.topics.themes().count(), 2);
}

#[test]
fn test_selecting_empty_theme_keeps_topics_idle() {
    let empty = sample_topics()[0].themes[1].clone();
    let (state, effects) = reduce(
        ready_state(),
        AppAction::Topics(TopicsAction::SelectTheme(empty)),
    );

    assert!(state.topics.is_idle());
    assert!(effects.is_empty());
}

#[test]
fn test_perfect_run_through_both_questions() {
    let state = ready_state();
    let (state, _) = run(
        state,
        vec![
            AppAction::Topics(TopicsAction::SelectTheme(planets())),
            AppAction::session(SessionAction::Start),
            toggle(0),
            commit(),
            next(),
            toggle(0),
            toggle(2),
            commit(),
        ],
    );

    let session = state.topics.session.as_ref().unwrap();
    assert_eq!(session.answers, vec![Verdict::Correct, Verdict::Correct]);
    assert_eq!(session.score, 100);

    let (state, effects) = reduce(state, next());
    assert_eq!(
        state.topics.session.as_ref().map(|s| s.phase),
        Some(SessionPhase::Finished)
    );
    assert!(matches!(
        effects.last(),
        Some(Effect::Send(AppAction::Topics(TopicsAction::Session(
            SessionAction::Finished
        ))))
    ));

    let (state, effects) = reduce(state, AppAction::session(SessionAction::Finished));
    assert!(effects
        .iter()
        .any(|e| matches!(e, Effect::ReportPerfectCompletion)));
    assert_eq!(state.topics.last_results.map(|r| r.points), Some(100));

    let (state, effects) = reduce(state, AppAction::Topics(TopicsAction::RoundRecorded));
    assert!(matches!(effects[..], [Effect::FetchStats(_)]));

    let (state, _) = reduce(state, AppAction::Topics(TopicsAction::Dismiss));
    assert!(state.topics.is_idle());
}

#[test]
fn test_two_questions_one_right_one_wrong() {
    let (state, _) = run(
        ready_state(),
        vec![
            AppAction::Topics(TopicsAction::SelectTheme(planets())),
            AppAction::session(SessionAction::Start),
            toggle(0),
            commit(),
            next(),
            toggle(1),
            commit(),
            next(),
        ],
    );

    let session = state.topics.session.as_ref().unwrap();
    assert_eq!(session.questions_complete, 2);
    assert_eq!(session.score, 50);
    assert_eq!(session.phase, SessionPhase::Finished);
    assert!(!session.is_perfect());
}

#[test]
fn test_multi_answer_subset_is_wrong() {
    let (state, _) = run(
        ready_state(),
        vec![
            AppAction::Topics(TopicsAction::SelectTheme(planets())),
            AppAction::session(SessionAction::Start),
            toggle(0),
            commit(),
            next(),
            toggle(2),
            commit(),
        ],
    );

    let session = state.topics.session.as_ref().unwrap();
    assert_eq!(session.answers, vec![Verdict::Correct, Verdict::Incorrect]);
}

#[test]
fn test_cancel_mid_session_keeps_completed_count() {
    let (state, effects) = run(
        ready_state(),
        vec![
            AppAction::Topics(TopicsAction::SelectTheme(planets())),
            AppAction::session(SessionAction::Start),
            toggle(0),
            commit(),
            next(),
            toggle(0),
            AppAction::session(SessionAction::RequestCancel),
            AppAction::session(SessionAction::ConfirmCancel),
        ],
    );

    let session = state.topics.session.as_ref().unwrap();
    assert_eq!(session.questions_complete, 1);
    assert!(session.is_finished());
    assert!(matches!(
        effects.last(),
        Some(Effect::Send(AppAction::Topics(TopicsAction::Session(
            SessionAction::Finished
        ))))
    ));
}

#[test]
fn test_same_seed_gives_same_presentation_order() {
    let select = vec![
        AppAction::Topics(TopicsAction::SelectTheme(planets())),
        AppAction::session(SessionAction::Start),
    ];
    let (a, _) = run(ready_state(), select.clone());
    let (b, _) = run(ready_state(), select);

    let order = |state: &AppState| state.topics.session.as_ref().unwrap().question.order.clone();
    assert_eq!(order(&a), order(&b));
}
