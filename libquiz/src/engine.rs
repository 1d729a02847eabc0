//! Answer evaluation
//!
//! A submission is correct only when the selected options are exactly the
//! question's correct options: no missing correct option, no extra wrong
//! one. Single-answer questions are the special case where that set has
//! one element.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::Question;

/// Correctness of a submitted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

impl From<bool> for Verdict {
    fn from(correct: bool) -> Self {
        if correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }
}

/// Evaluate a selection of option ids against a question
///
/// Total: an empty selection, or a question with no correct option, is
/// simply incorrect.
pub fn evaluate(question: &Question, selected_option_ids: &[i64]) -> Verdict {
    let selected: BTreeSet<i64> = selected_option_ids.iter().copied().collect();
    if selected.is_empty() {
        return Verdict::Incorrect;
    }

    let correct: BTreeSet<i64> = question.correct_options().map(|o| o.id).collect();
    Verdict::from(!correct.is_empty() && selected == correct)
}
