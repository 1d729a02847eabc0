//! Quiz session state machine
//!
//! Walks a theme's questions in list order, one [`QuestionState`] at a time,
//! and owns the per-question countdown.
//!
//! ```text
//! running <--decline-- awaiting-cancel-confirmation
//!    |  \--request-cancel--^        |
//!    |                          confirm
//!    +--last question done--> finished <--+
//! ```

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;

use super::effect::{lift, Effect, Effects, TimerId};
use super::question::{self, QuestionAction, QuestionState};
use super::results::QuizResults;
use super::QuizRules;
use crate::engine::Verdict;
use crate::types::{Round, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Running,
    AwaitingCancelConfirmation,
    Finished,
}

#[derive(Debug, Clone)]
pub struct QuizSessionState {
    pub theme: Arc<Theme>,

    /// Replaced wholesale on every advance
    pub question: QuestionState,

    /// Index of `question` in `theme.questions`
    pub position: usize,

    pub score: u32,
    pub questions_complete: usize,
    pub correct_answers: usize,

    /// Verdicts in answer order
    pub answers: Vec<Verdict>,

    /// Positions whose countdown ran out before a commit
    pub timeouts: Vec<usize>,

    pub phase: SessionPhase,

    /// Countdown time accumulated over the whole session
    pub time_played: Duration,

    /// Bumped every time the countdown restarts; stale ticks carry an old value
    pub countdown_epoch: u64,

    pub rules: QuizRules,

    rng: StdRng,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAction {
    /// (Re)start the countdown for the current question
    Start,
    /// Countdown quantum elapsed for the countdown with this epoch
    Tick(u64),
    Question(QuestionAction),
    RequestCancel,
    ConfirmCancel,
    DeclineCancel,
    /// Sent to the owner once the session reaches `finished`
    Finished,
}

impl SessionAction {
    pub fn label(&self) -> String {
        match self {
            SessionAction::Start => "start".to_string(),
            SessionAction::Tick(_) => "tick".to_string(),
            SessionAction::Question(action) => format!("question.{}", action.label()),
            SessionAction::RequestCancel => "request_cancel".to_string(),
            SessionAction::ConfirmCancel => "confirm_cancel".to_string(),
            SessionAction::DeclineCancel => "decline_cancel".to_string(),
            SessionAction::Finished => "finished".to_string(),
        }
    }
}

impl QuizSessionState {
    /// Session positioned on the theme's first question
    ///
    /// Returns `None` for a theme without questions.
    pub fn new(theme: Arc<Theme>, rules: QuizRules, mut rng: StdRng) -> Option<Self> {
        let first = theme.questions.first()?.clone();
        let question = QuestionState::shuffled(first, &mut rng);

        Some(Self {
            theme,
            question,
            position: 0,
            score: 0,
            questions_complete: 0,
            correct_answers: 0,
            answers: Vec::new(),
            timeouts: Vec::new(),
            phase: SessionPhase::Running,
            time_played: Duration::ZERO,
            countdown_epoch: 0,
            rules,
            rng,
        })
    }

    pub fn total_questions(&self) -> usize {
        self.theme.questions.len()
    }

    /// Completed questions as a fraction of the theme, 0.0..=1.0
    pub fn progress(&self) -> f64 {
        let total = self.total_questions();
        if total == 0 {
            return 0.0;
        }
        self.questions_complete as f64 / total as f64
    }

    pub fn shows_cancel_confirmation(&self) -> bool {
        self.phase == SessionPhase::AwaitingCancelConfirmation
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    /// Countdown left on the current question
    pub fn remaining_time(&self) -> Duration {
        self.rules.question_time.saturating_sub(self.question.elapsed)
    }

    /// Every question answered, every answer correct
    pub fn is_perfect(&self) -> bool {
        let total = self.total_questions();
        self.is_finished()
            && total > 0
            && self.questions_complete == total
            && self.correct_answers == total
    }

    pub fn results(&self) -> QuizResults {
        QuizResults {
            points: self.score,
            correct_answers: self.correct_answers,
            total_questions: self.total_questions(),
        }
    }

    pub fn round(&self) -> Round {
        Round {
            theme_id: self.theme.id,
            seconds_played: self.time_played.as_secs() as i64,
            answers: self.answers.iter().map(|v| v.is_correct()).collect(),
        }
    }

    fn record(&mut self, verdict: Verdict) {
        self.questions_complete += 1;
        self.answers.push(verdict);
        if verdict.is_correct() {
            self.correct_answers += 1;
            self.score = self.score.saturating_add(self.rules.correct_answer_points);
        }
    }
}

/// Session reducer
pub fn reduce(
    mut state: QuizSessionState,
    action: SessionAction,
) -> (QuizSessionState, Effects<SessionAction>) {
    match action {
        SessionAction::Start => {
            if state.phase != SessionPhase::Running {
                return (state, Vec::new());
            }
            restart_countdown(state)
        }

        SessionAction::Tick(epoch) => {
            if state.phase != SessionPhase::Running
                || epoch != state.countdown_epoch
                || state.question.is_answered()
            {
                return (state, Vec::new());
            }

            state.question.elapsed += state.rules.tick;
            state.time_played += state.rules.tick;

            if state.question.elapsed >= state.rules.question_time {
                return reduce(state, SessionAction::Question(QuestionAction::Timeout));
            }
            (state, Vec::new())
        }

        SessionAction::Question(action) => {
            if state.phase != SessionPhase::Running {
                return (state, Vec::new());
            }
            reduce_question(state, action)
        }

        SessionAction::RequestCancel => {
            if state.phase != SessionPhase::Running {
                return (state, Vec::new());
            }
            state.phase = SessionPhase::AwaitingCancelConfirmation;
            (state, vec![Effect::Cancel(TimerId::Countdown)])
        }

        SessionAction::ConfirmCancel => {
            if state.phase != SessionPhase::AwaitingCancelConfirmation {
                return (state, Vec::new());
            }
            finish(state)
        }

        SessionAction::DeclineCancel => {
            if state.phase != SessionPhase::AwaitingCancelConfirmation {
                return (state, Vec::new());
            }
            state.phase = SessionPhase::Running;
            restart_countdown(state)
        }

        // Handled by the owner.
        SessionAction::Finished => (state, Vec::new()),
    }
}

fn reduce_question(
    mut state: QuizSessionState,
    action: QuestionAction,
) -> (QuizSessionState, Effects<SessionAction>) {
    if action == QuestionAction::Continue {
        if !state.question.is_answered() {
            return (state, Vec::new());
        }
        return continue_flow(state);
    }

    let was_answered = state.question.is_answered();
    let timed_out = action == QuestionAction::Timeout;

    let (question, child_effects) = question::reduce(state.question, action);
    state.question = question;
    let mut effects = lift(child_effects, SessionAction::Question);

    let verdict = match state.question.answer {
        Some(verdict) if !was_answered => verdict,
        _ => return (state, effects),
    };

    state.record(verdict);
    effects.push(Effect::Cancel(TimerId::Countdown));

    if timed_out {
        state.timeouts.push(state.position);
        let (state, more) = continue_flow(state);
        effects.extend(more);
        return (state, effects);
    }
    (state, effects)
}

/// Advance to the next question, or finish after the last one
fn continue_flow(mut state: QuizSessionState) -> (QuizSessionState, Effects<SessionAction>) {
    let next = state.position + 1;
    match state.theme.questions.get(next).cloned() {
        Some(question) => {
            state.position = next;
            state.question = QuestionState::shuffled(question, &mut state.rng);
            restart_countdown(state)
        }
        None => finish(state),
    }
}

fn restart_countdown(mut state: QuizSessionState) -> (QuizSessionState, Effects<SessionAction>) {
    state.countdown_epoch += 1;
    state.question.elapsed = Duration::ZERO;

    if state.question.is_answered() {
        return (state, vec![Effect::Cancel(TimerId::Countdown)]);
    }

    let epoch = state.countdown_epoch;
    let period = state.rules.tick;
    (
        state,
        vec![Effect::Every {
            id: TimerId::Countdown,
            period,
            action: SessionAction::Tick(epoch),
        }],
    )
}

fn finish(mut state: QuizSessionState) -> (QuizSessionState, Effects<SessionAction>) {
    state.phase = SessionPhase::Finished;
    (
        state,
        vec![
            Effect::Cancel(TimerId::Countdown),
            Effect::Send(SessionAction::Finished),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnswerOption, Difficulty, Question};
    use rand::SeedableRng;

    fn question(id: i64) -> Question {
        Question {
            id,
            title: format!("Question {}", id),
            description: None,
            reference: None,
            difficulty: Difficulty::Easy,
            options: (0..3)
                .map(|i| AnswerOption {
                    id: id * 10 + i,
                    question_id: id,
                    text: Some(format!("option {}", i)),
                    image: None,
                    is_correct: i == 0,
                })
                .collect(),
        }
    }

    fn theme(count: i64) -> Arc<Theme> {
        Arc::new(Theme {
            id: 1,
            title: "Planets".to_string(),
            image: None,
            questions: (1..=count).map(question).collect(),
        })
    }

    fn rules() -> QuizRules {
        QuizRules {
            question_time: Duration::from_secs(1),
            tick: Duration::from_millis(250),
            correct_answer_points: 50,
            finish_delay: Duration::from_millis(300),
        }
    }

    fn session(count: i64) -> QuizSessionState {
        QuizSessionState::new(theme(count), rules(), StdRng::seed_from_u64(1)).unwrap()
    }

    fn step(state: QuizSessionState, action: SessionAction) -> QuizSessionState {
        reduce(state, action).0
    }

    fn answer(state: QuizSessionState, correct: bool) -> QuizSessionState {
        let index = if correct { 0 } else { 1 };
        let state = step(state, SessionAction::Question(QuestionAction::Toggle(index)));
        step(state, SessionAction::Question(QuestionAction::Commit))
    }

    fn next(state: QuizSessionState) -> QuizSessionState {
        step(state, SessionAction::Question(QuestionAction::Continue))
    }

    #[test]
    fn test_empty_theme_has_no_session() {
        assert!(QuizSessionState::new(theme(0), rules(), StdRng::seed_from_u64(1)).is_none());
    }

    #[test]
    fn test_start_schedules_countdown() {
        let (state, effects) = reduce(session(2), SessionAction::Start);
        assert_eq!(state.countdown_epoch, 1);
        match &effects[..] {
            [Effect::Every { id, period, action }] => {
                assert_eq!(*id, TimerId::Countdown);
                assert_eq!(*period, Duration::from_millis(250));
                assert_eq!(*action, SessionAction::Tick(1));
            }
            other => panic!("unexpected effects {:?}", other),
        }
    }

    #[test]
    fn test_tick_accumulates_elapsed_time() {
        let state = step(session(2), SessionAction::Start);
        let state = step(state, SessionAction::Tick(1));
        let state = step(state, SessionAction::Tick(1));

        assert_eq!(state.question.elapsed, Duration::from_millis(500));
        assert_eq!(state.time_played, Duration::from_millis(500));
        assert_eq!(state.remaining_time(), Duration::from_millis(500));
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let state = step(session(2), SessionAction::Start);
        let state = step(state, SessionAction::Tick(0));
        assert_eq!(state.question.elapsed, Duration::ZERO);
    }

    #[test]
    fn test_commit_scores_and_stops_countdown() {
        let state = step(session(2), SessionAction::Start);
        let state = step(state, SessionAction::Question(QuestionAction::Toggle(0)));
        let (state, effects) = reduce(state, SessionAction::Question(QuestionAction::Commit));

        assert_eq!(state.score, 50);
        assert_eq!(state.questions_complete, 1);
        assert_eq!(state.correct_answers, 1);
        assert!(matches!(
            effects[..],
            [
                Effect::Feedback(Verdict::Correct),
                Effect::Cancel(TimerId::Countdown)
            ]
        ));
    }

    #[test]
    fn test_ticks_after_commit_are_ignored() {
        let state = step(session(2), SessionAction::Start);
        let state = answer(state, true);
        let state = step(state, SessionAction::Tick(1));
        assert_eq!(state.question.elapsed, Duration::ZERO);
    }

    #[test]
    fn test_continue_requires_answer() {
        let state = step(session(2), SessionAction::Start);
        let (state, effects) = reduce(state, SessionAction::Question(QuestionAction::Continue));
        assert_eq!(state.position, 0);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_continue_advances_and_restarts_countdown() {
        let state = step(session(2), SessionAction::Start);
        let state = answer(state, true);
        let (state, effects) = reduce(state, SessionAction::Question(QuestionAction::Continue));

        assert_eq!(state.position, 1);
        assert_eq!(state.question.question.id, 2);
        assert!(!state.question.is_answered());
        assert_eq!(state.countdown_epoch, 2);
        assert!(matches!(
            effects[..],
            [Effect::Every {
                action: SessionAction::Tick(2),
                ..
            }]
        ));
    }

    #[test]
    fn test_timeout_marks_incorrect_and_advances() {
        let state = step(session(2), SessionAction::Start);
        let state = step(state, SessionAction::Question(QuestionAction::Toggle(0)));

        let mut state = state;
        let mut effects = Vec::new();
        for _ in 0..4 {
            let (next, step_effects) = reduce(state, SessionAction::Tick(1));
            state = next;
            effects = step_effects;
        }

        assert_eq!(state.questions_complete, 1);
        assert_eq!(state.score, 0);
        assert_eq!(state.answers, vec![Verdict::Incorrect]);
        assert_eq!(state.timeouts, vec![0]);
        assert_eq!(state.position, 1);
        assert!(matches!(
            effects[..],
            [
                Effect::Feedback(Verdict::Incorrect),
                Effect::Cancel(TimerId::Countdown),
                Effect::Every {
                    action: SessionAction::Tick(2),
                    ..
                }
            ]
        ));
    }

    #[test]
    fn test_score_saturates_instead_of_overflowing() {
        let rules = QuizRules {
            correct_answer_points: u32::MAX,
            ..rules()
        };
        let state = QuizSessionState::new(theme(2), rules, StdRng::seed_from_u64(1)).unwrap();
        let state = step(state, SessionAction::Start);
        let state = next(answer(state, true));
        let state = next(answer(state, true));

        assert!(state.is_finished());
        assert_eq!(state.correct_answers, 2);
        assert_eq!(state.score, u32::MAX);
        assert_eq!(state.results().points, u32::MAX);
    }

    #[test]
    fn test_two_question_scenario() {
        let state = step(session(2), SessionAction::Start);
        let state = next(answer(state, true));
        let state = answer(state, false);
        let (state, effects) = reduce(state, SessionAction::Question(QuestionAction::Continue));

        assert_eq!(state.questions_complete, 2);
        assert_eq!(state.score, 50);
        assert_eq!(state.phase, SessionPhase::Finished);
        assert_eq!(state.progress(), 1.0);
        assert!(state.timeouts.is_empty());
        assert!(!state.is_perfect());
        assert!(matches!(
            effects[..],
            [
                Effect::Cancel(TimerId::Countdown),
                Effect::Send(SessionAction::Finished)
            ]
        ));
    }

    #[test]
    fn test_all_correct_is_perfect() {
        let mut state = step(session(3), SessionAction::Start);
        for _ in 0..3 {
            state = next(answer(state, true));
        }
        assert!(state.is_finished());
        assert_eq!(state.score, 150);
        assert!(state.is_perfect());
        assert_eq!(state.results().correct_answers, 3);
    }

    #[test]
    fn test_cancel_confirmation_flow() {
        let state = step(session(3), SessionAction::Start);
        let (state, effects) = reduce(state, SessionAction::RequestCancel);
        assert!(state.shows_cancel_confirmation());
        assert!(matches!(effects[..], [Effect::Cancel(TimerId::Countdown)]));

        // Input is frozen while the confirmation is up
        let state = step(state, SessionAction::Question(QuestionAction::Toggle(0)));
        assert!(!state.question.can_commit);

        let (state, effects) = reduce(state, SessionAction::DeclineCancel);
        assert_eq!(state.phase, SessionPhase::Running);
        assert!(matches!(effects[..], [Effect::Every { .. }]));
    }

    #[test]
    fn test_confirm_cancel_abandons_without_completing_question() {
        let state = step(session(3), SessionAction::Start);
        let state = next(answer(state, true));
        let state = step(state, SessionAction::Question(QuestionAction::Toggle(0)));
        let state = step(state, SessionAction::RequestCancel);
        let (state, effects) = reduce(state, SessionAction::ConfirmCancel);

        assert!(state.is_finished());
        assert_eq!(state.questions_complete, 1);
        assert!(!state.is_perfect());
        assert!(matches!(effects.last(), Some(Effect::Send(SessionAction::Finished))));
    }

    #[test]
    fn test_confirm_without_request_is_ignored() {
        let (state, effects) = reduce(session(2), SessionAction::ConfirmCancel);
        assert_eq!(state.phase, SessionPhase::Running);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_round_summary() {
        let state = step(session(2), SessionAction::Start);
        let state = step(state, SessionAction::Tick(1));
        let state = step(state, SessionAction::Tick(1));
        let state = step(state, SessionAction::Tick(1));
        let state = step(state, SessionAction::Tick(1));
        let state = step(state, SessionAction::Tick(2));
        let state = step(state, SessionAction::Tick(2));
        let state = step(state, SessionAction::Tick(2));
        let state = step(state, SessionAction::Tick(2));

        assert!(state.is_finished());
        let round = state.round();
        assert_eq!(round.theme_id, 1);
        assert_eq!(round.seconds_played, 2);
        assert_eq!(round.answers, vec![false, false]);
    }

    #[test]
    fn test_action_labels() {
        assert_eq!(
            SessionAction::Question(QuestionAction::Commit).label(),
            "question.commit"
        );
        assert_eq!(SessionAction::Tick(3).label(), "tick");
    }
}
