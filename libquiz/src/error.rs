//! Error types for the quiz library

use thiserror::Error;

pub type Result<T> = std::result::Result<T, QuizError>;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store is no longer running")]
    StoreClosed,
}

impl QuizError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            QuizError::InvalidInput(_) => 3,
            QuizError::Config(_) => 1,
            QuizError::Database(_) => 1,
            QuizError::StoreClosed => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database operation failed: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Failed to encode row: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_invalid_input() {
        let error = QuizError::InvalidInput("Empty theme".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_config_error() {
        let config_error = ConfigError::MissingField("database.path".to_string());
        let error = QuizError::Config(config_error);
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_database_error() {
        let db_error = DbError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "File not found",
        ));
        let error = QuizError::Database(db_error);
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_store_closed() {
        assert_eq!(QuizError::StoreClosed.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting_invalid_value() {
        let error = QuizError::Config(ConfigError::Invalid {
            field: "quiz.tick".to_string(),
            reason: "must be greater than zero".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid value for quiz.tick: must be greater than zero"
        );
    }

    #[test]
    fn test_error_message_formatting_store_closed() {
        assert_eq!(QuizError::StoreClosed.to_string(), "Store is no longer running");
    }
}
