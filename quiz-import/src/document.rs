//! Import document parsing and checks
//!
//! The document is a JSON array of topics in the same shape the library
//! serializes them.

use std::collections::HashSet;
use std::path::Path;

use libquiz::{QuizError, Result, Topic};

/// Read and parse a topics document
pub fn load(path: &Path) -> Result<Vec<Topic>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        QuizError::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<Vec<Topic>> {
    serde_json::from_str(content)
        .map_err(|e| QuizError::InvalidInput(format!("Malformed topics document: {}", e)))
}

/// Content problems that would make a theme unplayable
///
/// Duplicate ids are hard errors since ids become primary keys. Questions
/// that cannot be answered correctly are reported as warnings.
pub fn check(topics: &[Topic]) -> Result<Vec<String>> {
    let mut warnings = Vec::new();
    let mut topic_ids = HashSet::new();
    let mut theme_ids = HashSet::new();
    let mut question_ids = HashSet::new();
    let mut option_ids = HashSet::new();

    for topic in topics {
        if !topic_ids.insert(topic.id) {
            return Err(duplicate("topic", topic.id));
        }
        for theme in &topic.themes {
            if !theme_ids.insert(theme.id) {
                return Err(duplicate("theme", theme.id));
            }
            if theme.questions.is_empty() {
                warnings.push(format!("Theme {} '{}' has no questions", theme.id, theme.title));
            }
            for question in &theme.questions {
                if !question_ids.insert(question.id) {
                    return Err(duplicate("question", question.id));
                }
                if !question.has_correct_answer() {
                    warnings.push(format!(
                        "Question {} '{}' has no correct option",
                        question.id, question.title
                    ));
                }
                for option in &question.options {
                    if !option_ids.insert(option.id) {
                        return Err(duplicate("option", option.id));
                    }
                    if option.question_id != question.id {
                        return Err(QuizError::InvalidInput(format!(
                            "Option {} names question {} but is listed under question {}",
                            option.id, option.question_id, question.id
                        )));
                    }
                    if option.label().is_empty() {
                        warnings.push(format!("Option {} has neither text nor image", option.id));
                    }
                }
            }
        }
    }

    Ok(warnings)
}

fn duplicate(kind: &str, id: i64) -> QuizError {
    QuizError::InvalidInput(format!("Duplicate {} id {}", kind, id))
}
