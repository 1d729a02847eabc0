//! Outcome of a finished session

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Bad,
    Nice,
    Excellent,
}

impl Grade {
    pub fn title(self) -> &'static str {
        match self {
            Grade::Bad => "Keep practicing",
            Grade::Nice => "Nice work",
            Grade::Excellent => "Excellent!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResults {
    pub points: u32,
    pub correct_answers: usize,
    pub total_questions: usize,
}

impl QuizResults {
    /// Correct answers as a fraction of all questions in the theme
    pub fn ratio(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        self.correct_answers as f64 / self.total_questions as f64
    }

    pub fn grade(&self) -> Grade {
        let ratio = self.ratio();
        if ratio < 0.25 {
            Grade::Bad
        } else if ratio < 0.8 {
            Grade::Nice
        } else {
            Grade::Excellent
        }
    }
}
