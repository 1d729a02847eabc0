//! Typed commands → root actions
//!
//! What a line means depends on what is on screen, so parsing takes the
//! current snapshot. Lines that mean nothing right now yield `None`.

use libquiz::app::{AppAction, AppState, QuestionAction, SessionAction, SessionPhase, TopicsAction};

/// `q` quits from any screen
pub fn is_quit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("q")
}

/// Map one input line to an action for the current screen
pub fn parse_command(state: &AppState, line: &str) -> Option<AppAction> {
    let command = line.trim().to_ascii_lowercase();
    if command.is_empty() || !state.topics.loaded {
        return None;
    }

    let Some(session) = state.topics.session.as_ref() else {
        // Topic list: pick a theme by its displayed number
        let number = parse_number(&command)?;
        let (_, theme) = state.topics.themes().nth(number - 1)?;
        return Some(AppAction::Topics(TopicsAction::SelectTheme(theme.clone())));
    };

    match session.phase {
        SessionPhase::Finished => None,

        SessionPhase::AwaitingCancelConfirmation => match command.as_str() {
            "y" | "yes" => Some(AppAction::session(SessionAction::ConfirmCancel)),
            "n" | "no" => Some(AppAction::session(SessionAction::DeclineCancel)),
            _ => None,
        },

        SessionPhase::Running => {
            let question = &session.question;
            match command.as_str() {
                "c" if question.can_commit && !question.is_answered() => {
                    Some(AppAction::question(QuestionAction::Commit))
                }
                "n" if question.is_answered() => Some(AppAction::question(QuestionAction::Continue)),
                "x" => Some(AppAction::session(SessionAction::RequestCancel)),
                "r" if !question.complaint_sent => Some(AppAction::question(QuestionAction::Complain)),
                _ if !question.is_answered() => {
                    let number = parse_number(&command)?;
                    let index = *question.order.get(number - 1)?;
                    Some(AppAction::question(QuestionAction::Toggle(index)))
                }
                _ => None,
            }
        }
    }
}

/// 1-based number as typed by the player
fn parse_number(command: &str) -> Option<usize> {
    command.parse::<usize>().ok().filter(|&n| n > 0)
}
