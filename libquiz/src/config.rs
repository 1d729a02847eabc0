//! Configuration management for the quiz

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app::QuizRules;
use crate::error::{ConfigError, Result};

const DEFAULT_QUESTION_TIME: Duration = Duration::from_secs(10);
const DEFAULT_TICK: Duration = Duration::from_millis(100);
const DEFAULT_CORRECT_ANSWER_POINTS: u32 = 50;
const DEFAULT_FINISH_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub quiz: QuizConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Timing and scoring knobs, written as humantime strings ("10s", "250ms")
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizConfig {
    pub question_time: Option<String>,
    pub tick: Option<String>,
    pub correct_answer_points: Option<u32>,
    pub finish_delay: Option<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from the default location, falling back to
    /// [`Config::default_config`] when no file exists there
    pub fn load_or_default() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::default_config());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        // Surface bad durations at load time rather than at session start.
        config.quiz.rules()?;
        Ok(config)
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        let db_path = resolve_data_path()
            .map(|dir| dir.join("quiz.db").to_string_lossy().into_owned())
            .unwrap_or_else(|_| "~/.local/share/quiz/quiz.db".to_string());

        Self {
            database: DatabaseConfig { path: db_path },
            quiz: QuizConfig::default(),
        }
    }

    /// Database path with `~` expanded
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.database.path).to_string())
    }
}

impl QuizConfig {
    /// Resolve the configured values (or defaults) into [`QuizRules`]
    pub fn rules(&self) -> Result<QuizRules> {
        let question_time = parse_duration(
            "quiz.question_time",
            self.question_time.as_deref(),
            DEFAULT_QUESTION_TIME,
        )?;
        let tick = parse_duration("quiz.tick", self.tick.as_deref(), DEFAULT_TICK)?;
        let finish_delay = parse_duration(
            "quiz.finish_delay",
            self.finish_delay.as_deref(),
            DEFAULT_FINISH_DELAY,
        )?;

        QuizRules::new(
            question_time,
            tick,
            self.correct_answer_points.unwrap_or(DEFAULT_CORRECT_ANSWER_POINTS),
            finish_delay,
        )
    }
}

impl Default for QuizRules {
    fn default() -> Self {
        Self {
            question_time: DEFAULT_QUESTION_TIME,
            tick: DEFAULT_TICK,
            correct_answer_points: DEFAULT_CORRECT_ANSWER_POINTS,
            finish_delay: DEFAULT_FINISH_DELAY,
        }
    }
}

fn parse_duration(field: &str, value: Option<&str>, default: Duration) -> Result<Duration> {
    let Some(raw) = value else {
        return Ok(default);
    };

    let duration = humantime::parse_duration(raw).map_err(|e| ConfigError::Invalid {
        field: field.to_string(),
        reason: e.to_string(),
    })?;

    if duration.is_zero() {
        return Err(ConfigError::Invalid {
            field: field.to_string(),
            reason: "must be greater than zero".to_string(),
        }
        .into());
    }

    Ok(duration)
}

/// Resolve the configuration file path using the XDG Base Directory layout
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("QUIZ_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("quiz").join("config.toml"))
}

/// Resolve the data directory path using the XDG Base Directory layout
pub fn resolve_data_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| ConfigError::MissingField("data directory".to_string()))?;

    Ok(data_dir.join("quiz"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuizError;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
            [database]
            path = "/tmp/quiz.db"

            [quiz]
            question_time = "20s"
            tick = "50ms"
            correct_answer_points = 10
            finish_delay = "1s"
            "#,
        )
        .unwrap();

        let rules = config.quiz.rules().unwrap();
        assert_eq!(config.database.path, "/tmp/quiz.db");
        assert_eq!(rules.question_time, Duration::from_secs(20));
        assert_eq!(rules.tick, Duration::from_millis(50));
        assert_eq!(rules.correct_answer_points, 10);
        assert_eq!(rules.finish_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_quiz_section_is_optional() {
        let config = Config::parse("[database]\npath = \"quiz.db\"\n").unwrap();
        let rules = config.quiz.rules().unwrap();

        assert_eq!(rules.question_time, Duration::from_secs(10));
        assert_eq!(rules.tick, Duration::from_millis(100));
        assert_eq!(rules.correct_answer_points, 50);
        assert_eq!(rules.finish_delay, Duration::from_millis(300));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let result = Config::parse("[database]\npath = \"q.db\"\n[quiz]\ntick = \"0s\"\n");
        match result {
            Err(QuizError::Config(ConfigError::Invalid { field, .. })) => {
                assert_eq!(field, "quiz.tick");
            }
            other => panic!("Expected invalid tick, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_duration_rejected() {
        let result =
            Config::parse("[database]\npath = \"q.db\"\n[quiz]\nquestion_time = \"soon\"\n");
        assert!(matches!(
            result,
            Err(QuizError::Config(ConfigError::Invalid { .. }))
        ));
    }

    #[test]
    fn test_tick_longer_than_question_rejected() {
        let result = Config::parse(
            "[database]\npath = \"q.db\"\n[quiz]\nquestion_time = \"1s\"\ntick = \"2s\"\n",
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_database_section_is_parse_error() {
        let result = Config::parse("[quiz]\ntick = \"1s\"\n");
        assert!(matches!(
            result,
            Err(QuizError::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_database_path_expands_tilde() {
        let config = Config {
            database: DatabaseConfig {
                path: "~/quiz.db".to_string(),
            },
            quiz: QuizConfig::default(),
        };
        let path = config.database_path();
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("quiz.db"));
    }

    #[test]
    #[serial]
    fn test_config_path_from_env() {
        std::env::set_var("QUIZ_CONFIG", "/etc/quiz/custom.toml");
        let path = resolve_config_path().unwrap();
        std::env::remove_var("QUIZ_CONFIG");

        assert_eq!(path, PathBuf::from("/etc/quiz/custom.toml"));
    }

    #[test]
    #[serial]
    fn test_load_or_default_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.toml");
        std::env::set_var("QUIZ_CONFIG", missing.to_str().unwrap());
        let config = Config::load_or_default();
        std::env::remove_var("QUIZ_CONFIG");

        let config = config.unwrap();
        assert!(config.database.path.ends_with("quiz.db"));
    }

    #[test]
    #[serial]
    fn test_load_reads_file_from_env_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[database]\npath = \"/data/q.db\"\n").unwrap();

        std::env::set_var("QUIZ_CONFIG", path.to_str().unwrap());
        let config = Config::load();
        std::env::remove_var("QUIZ_CONFIG");

        assert_eq!(config.unwrap().database.path, "/data/q.db");
    }
}
