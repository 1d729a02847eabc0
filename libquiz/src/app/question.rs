//! Question state machine
//!
//! One question on screen: which options are selected, whether the answer
//! can be checked, and the verdict once it has been.
//!
//! ```text
//! unanswered --commit/timeout--> answered --continue--> (parent advances)
//! ```
//!
//! Once answered, the selection is frozen: further toggles are ignored.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use super::effect::{Effect, Effects};
use crate::engine::{self, Verdict};
use crate::types::{AnswerOption, Question};

#[derive(Debug, Clone)]
pub struct QuestionState {
    pub question: Question,

    /// Selection flag per option, parallel to `question.options`
    pub selected: Vec<bool>,

    /// True iff at least one option is selected
    pub can_commit: bool,

    /// Set by commit or timeout
    pub answer: Option<Verdict>,

    /// Time spent on this question so far
    pub elapsed: Duration,

    /// Presentation order: a permutation of option indices
    pub order: Vec<usize>,

    /// A complaint about this question was already sent
    pub complaint_sent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionAction {
    /// Toggle the option at this index of `question.options`
    Toggle(usize),
    /// Check the current selection
    Commit,
    /// Countdown ran out; answer with an empty selection
    Timeout,
    /// Move on; handled by the owning session
    Continue,
    /// Report the question as wrong
    Complain,
}

impl QuestionAction {
    pub fn label(&self) -> &'static str {
        match self {
            QuestionAction::Toggle(_) => "toggle",
            QuestionAction::Commit => "commit",
            QuestionAction::Timeout => "timeout",
            QuestionAction::Continue => "continue",
            QuestionAction::Complain => "complain",
        }
    }
}

impl QuestionState {
    /// Fresh, unanswered state presenting options in the given order
    ///
    /// An `order` that is not a permutation of the option indices falls
    /// back to display order.
    pub fn new(question: Question, order: Vec<usize>) -> Self {
        let count = question.options.len();
        let order = if is_permutation(&order, count) {
            order
        } else {
            (0..count).collect()
        };

        Self {
            question,
            selected: vec![false; count],
            can_commit: false,
            answer: None,
            elapsed: Duration::ZERO,
            order,
            complaint_sent: false,
        }
    }

    /// Fresh state with options in their stored display order
    pub fn in_display_order(question: Question) -> Self {
        Self::new(question, Vec::new())
    }

    /// Fresh state with a presentation order drawn from `rng`
    pub fn shuffled<R: Rng + ?Sized>(question: Question, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..question.options.len()).collect();
        order.shuffle(rng);
        Self::new(question, order)
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }

    pub fn is_multi_select(&self) -> bool {
        self.question.has_multiple_correct_answers()
    }

    pub fn selected_option_ids(&self) -> Vec<i64> {
        self.question
            .options
            .iter()
            .zip(&self.selected)
            .filter(|(_, &selected)| selected)
            .map(|(option, _)| option.id)
            .collect()
    }

    /// Verdict the current selection would get
    pub fn compile_answer(&self) -> Verdict {
        engine::evaluate(&self.question, &self.selected_option_ids())
    }

    /// Options in presentation order as `(option index, option, selected)`
    pub fn presented_options(&self) -> impl Iterator<Item = (usize, &AnswerOption, bool)> + '_ {
        self.order
            .iter()
            .map(move |&index| (index, &self.question.options[index], self.selected[index]))
    }

    fn toggle(&mut self, index: usize) {
        if self.is_multi_select() {
            self.selected[index] = !self.selected[index];
        } else {
            // Single-select: picking an option clears the others, picking
            // the sole selected one clears everything.
            let was_selected = self.selected[index];
            for (i, flag) in self.selected.iter_mut().enumerate() {
                *flag = i == index && !was_selected;
            }
        }
        self.can_commit = self.selected.iter().any(|&s| s);
    }
}

/// Question reducer
pub fn reduce(mut state: QuestionState, action: QuestionAction) -> (QuestionState, Effects<QuestionAction>) {
    match action {
        QuestionAction::Toggle(index) => {
            if state.is_answered() || index >= state.selected.len() {
                return (state, Vec::new());
            }
            state.toggle(index);
            (state, Vec::new())
        }

        QuestionAction::Commit => {
            if !state.can_commit || state.is_answered() {
                return (state, Vec::new());
            }
            let verdict = state.compile_answer();
            state.answer = Some(verdict);
            (state, vec![Effect::Feedback(verdict)])
        }

        QuestionAction::Timeout => {
            if state.is_answered() {
                return (state, Vec::new());
            }
            let verdict = engine::evaluate(&state.question, &[]);
            state.answer = Some(verdict);
            (state, vec![Effect::Feedback(verdict)])
        }

        // The owning session replaces this state when it advances.
        QuestionAction::Continue => (state, Vec::new()),

        QuestionAction::Complain => {
            if state.complaint_sent {
                return (state, Vec::new());
            }
            state.complaint_sent = true;
            let question_id = state.question.id;
            (state, vec![Effect::ReportComplaint(question_id)])
        }
    }
}

fn is_permutation(order: &[usize], count: usize) -> bool {
    if order.len() != count {
        return false;
    }
    let mut seen = vec![false; count];
    for &index in order {
        if index >= count || seen[index] {
            return false;
        }
        seen[index] = true;
    }
    true
}
