//! Text rendering of state snapshots
//!
//! Snapshots arrive after every action, countdown ticks included. Output is
//! written only when the visible screen differs from the last one drawn.

use std::io::{self, Write};
use std::time::Duration;

use libquiz::app::{AppState, QuizSessionState, SessionPhase};
use libquiz::Verdict;

/// What is on screen, minus anything that only changes with time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Topics {
        themes: usize,
    },
    Question {
        position: usize,
        selected: Vec<bool>,
        answer: Option<Verdict>,
        complaint_sent: bool,
    },
    ConfirmCancel,
    Results,
}

impl Screen {
    pub fn of(state: &AppState) -> Self {
        if !state.topics.loaded {
            return Screen::Loading;
        }
        match state.topics.session.as_ref() {
            None => Screen::Topics {
                themes: state.topics.themes().count(),
            },
            Some(session) => match session.phase {
                SessionPhase::Running => Screen::Question {
                    position: session.position,
                    selected: session.question.selected.clone(),
                    answer: session.question.answer,
                    complaint_sent: session.question.complaint_sent,
                },
                SessionPhase::AwaitingCancelConfirmation => Screen::ConfirmCancel,
                SessionPhase::Finished => Screen::Results,
            },
        }
    }
}

pub struct Renderer<W: Write> {
    out: W,
    last: Option<Screen>,

    /// Answers of the current session already accounted for
    answers_seen: usize,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last: None,
            answers_seen: 0,
        }
    }

    /// Draw `state` if its screen changed; returns whether anything was written
    pub fn render(&mut self, state: &AppState) -> io::Result<bool> {
        let screen = Screen::of(state);
        if self.last.as_ref() == Some(&screen) {
            return Ok(false);
        }

        if self.timed_out(state) {
            writeln!(self.out, "Time's up!")?;
        }

        match &screen {
            Screen::Loading => writeln!(self.out, "Loading...")?,
            Screen::Topics { .. } => self.topics(state)?,
            Screen::Question { .. } => {
                if let Some(session) = state.topics.session.as_ref() {
                    self.question(session)?;
                }
            }
            Screen::ConfirmCancel => {
                writeln!(self.out, "Leave this quiz? Progress will be lost. [y/n]")?
            }
            Screen::Results => self.results(state)?,
        }
        self.out.flush()?;

        self.last = Some(screen);
        Ok(true)
    }

    /// Short reminder of the commands valid on the current screen
    pub fn hint(&mut self, state: &AppState) -> io::Result<()> {
        let hint = match Screen::of(state) {
            Screen::Loading | Screen::Results => "Please wait...",
            Screen::Topics { .. } => "Type a theme number, or q to quit.",
            Screen::Question { answer: None, .. } => {
                "Type an option number to toggle it, c to check, x to leave, r to report."
            }
            Screen::Question { .. } => "Type n for the next question, x to leave, r to report.",
            Screen::ConfirmCancel => "Type y to leave or n to keep playing.",
        };
        writeln!(self.out, "{}", hint)?;
        self.out.flush()
    }

    /// A question answered since the last draw ran out of time
    ///
    /// Several actions can land between two draws, so this reads the
    /// session's own record rather than comparing screens.
    fn timed_out(&mut self, state: &AppState) -> bool {
        let Some(session) = state.topics.session.as_ref() else {
            self.answers_seen = 0;
            return false;
        };

        let seen = if session.answers.len() < self.answers_seen {
            0
        } else {
            self.answers_seen
        };
        self.answers_seen = session.answers.len();
        session.timeouts.iter().any(|&position| position >= seen)
    }

    fn topics(&mut self, state: &AppState) -> io::Result<()> {
        writeln!(self.out)?;
        if let Some(stats) = state.stats {
            let played = Duration::from_secs(stats.seconds_played.max(0) as u64);
            writeln!(self.out, "Time played: {}", humantime::format_duration(played))?;
        }

        if state.topics.topics.is_empty() {
            writeln!(self.out, "No topics available. Import some with quiz-import.")?;
            return Ok(());
        }

        let mut number = 0;
        for topic in state.topics.topics.iter() {
            writeln!(self.out, "== {} ==", topic.title)?;
            for theme in &topic.themes {
                number += 1;
                writeln!(
                    self.out,
                    "  {:>2}. {} ({} questions)",
                    number,
                    theme.title,
                    theme.questions.len()
                )?;
            }
        }
        writeln!(self.out, "Pick a theme:")
    }

    fn question(&mut self, session: &QuizSessionState) -> io::Result<()> {
        let state = &session.question;
        let question = &state.question;

        writeln!(self.out)?;
        writeln!(
            self.out,
            "[{}] Question {}/{}  score {}  {}s left",
            session.theme.title,
            session.position + 1,
            session.total_questions(),
            session.score,
            session.remaining_time().as_secs()
        )?;
        writeln!(self.out, "{}", question.title)?;
        if let Some(description) = &question.description {
            writeln!(self.out, "{}", description)?;
        }
        if state.is_multi_select() {
            writeln!(self.out, "(more than one answer is correct)")?;
        }

        for (shown, (_, option, selected)) in state.presented_options().enumerate() {
            let mark = if selected { "x" } else { " " };
            let outcome = match (state.answer, option.is_correct) {
                (Some(_), true) => "  <- correct",
                _ => "",
            };
            writeln!(self.out, "  {}. [{}] {}{}", shown + 1, mark, option.label(), outcome)?;
        }

        match state.answer {
            Some(Verdict::Correct) => writeln!(self.out, "Correct! (n: next)")?,
            Some(Verdict::Incorrect) => writeln!(
                self.out,
                "Wrong. Answer: {} (n: next)",
                question.correct_answer_description()
            )?,
            None => {}
        }
        if state.complaint_sent {
            writeln!(self.out, "Thanks, this question was reported.")?;
        }
        Ok(())
    }

    fn results(&mut self, state: &AppState) -> io::Result<()> {
        let results = state
            .topics
            .last_results
            .or_else(|| state.topics.session.as_ref().map(|s| s.results()));

        writeln!(self.out)?;
        if let Some(results) = results {
            writeln!(self.out, "{}", results.grade().title())?;
            writeln!(
                self.out,
                "{}/{} correct, {} points",
                results.correct_answers, results.total_questions, results.points
            )?;
        }
        Ok(())
    }
}
