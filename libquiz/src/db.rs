//! SQLite persistence

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::environment::Persistence;
use crate::error::{DbError, QuizError, Result};
use crate::types::{AnswerOption, Difficulty, Question, Round, Stats, Theme, Topic};

/// Row counts written by [`Database::import_topics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub topics: usize,
    pub themes: usize,
    pub questions: usize,
    pub options: usize,
}

/// SQLite-backed content and history store
///
/// The connection pool is created on first use, so constructing a
/// `Database` never touches the filesystem.
pub struct Database {
    path: PathBuf,
    pool: OnceCell<SqlitePool>,
}

impl Database {
    /// Handle to the database at `db_path` (tilde-expanded), opened lazily
    pub fn open(db_path: &str) -> Self {
        let expanded_path = shellexpand::tilde(db_path).to_string();
        Self {
            path: PathBuf::from(expanded_path),
            pool: OnceCell::new(),
        }
    }

    /// Open and migrate right away
    pub async fn new(db_path: &str) -> Result<Self> {
        let db = Self::open(db_path);
        db.migrate().await?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn pool(&self) -> Result<&SqlitePool> {
        self.pool
            .get_or_try_init(|| async {
                if let Some(parent) = self.path.parent() {
                    std::fs::create_dir_all(parent).map_err(DbError::IoError)?;
                }

                // mode=rwc creates the file when missing
                let db_url = format!(
                    "sqlite://{}?mode=rwc",
                    self.path.to_string_lossy().replace('\\', "/")
                );
                debug!(path = %self.path.display(), "Opening database");

                let pool = SqlitePool::connect(&db_url)
                    .await
                    .map_err(DbError::SqlxError)?;
                Ok::<_, QuizError>(pool)
            })
            .await
    }

    /// Replace all content rows with `topics`, in one transaction
    ///
    /// Rounds and complaints are kept. Ids come from the input; list order
    /// becomes display order.
    pub async fn import_topics(&self, topics: &[Topic]) -> Result<ImportSummary> {
        let pool = self.pool().await?;
        let mut tx = pool.begin().await.map_err(DbError::SqlxError)?;
        let mut summary = ImportSummary::default();

        for table in ["options", "questions", "themes", "topics"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await
                .map_err(DbError::SqlxError)?;
        }

        for (topic_pos, topic) in topics.iter().enumerate() {
            sqlx::query("INSERT INTO topics (id, title, position) VALUES (?, ?, ?)")
                .bind(topic.id)
                .bind(&topic.title)
                .bind(topic_pos as i64)
                .execute(&mut *tx)
                .await
                .map_err(DbError::SqlxError)?;
            summary.topics += 1;

            for (theme_pos, theme) in topic.themes.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO themes (id, topic_id, title, image, position)
                    VALUES (?, ?, ?, ?, ?)
                    "#,
                )
                .bind(theme.id)
                .bind(topic.id)
                .bind(&theme.title)
                .bind(&theme.image)
                .bind(theme_pos as i64)
                .execute(&mut *tx)
                .await
                .map_err(DbError::SqlxError)?;
                summary.themes += 1;

                for (question_pos, question) in theme.questions.iter().enumerate() {
                    sqlx::query(
                        r#"
                        INSERT INTO questions (id, theme_id, title, description, reference, difficulty, position)
                        VALUES (?, ?, ?, ?, ?, ?, ?)
                        "#,
                    )
                    .bind(question.id)
                    .bind(theme.id)
                    .bind(&question.title)
                    .bind(&question.description)
                    .bind(&question.reference)
                    .bind(question.difficulty.level())
                    .bind(question_pos as i64)
                    .execute(&mut *tx)
                    .await
                    .map_err(DbError::SqlxError)?;
                    summary.questions += 1;

                    for (option_pos, option) in question.options.iter().enumerate() {
                        sqlx::query(
                            r#"
                            INSERT INTO options (id, question_id, text, image, is_correct, position)
                            VALUES (?, ?, ?, ?, ?, ?)
                            "#,
                        )
                        .bind(option.id)
                        .bind(question.id)
                        .bind(&option.text)
                        .bind(&option.image)
                        .bind(option.is_correct)
                        .bind(option_pos as i64)
                        .execute(&mut *tx)
                        .await
                        .map_err(DbError::SqlxError)?;
                        summary.options += 1;
                    }
                }
            }
        }

        tx.commit().await.map_err(DbError::SqlxError)?;
        Ok(summary)
    }

    /// Question ids of all stored complaints, oldest first
    pub async fn complaints(&self) -> Result<Vec<i64>> {
        let pool = self.pool().await?;
        let rows = sqlx::query("SELECT question_id FROM complaints ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(DbError::SqlxError)?;

        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            ids.push(row.try_get("question_id").map_err(DbError::SqlxError)?);
        }
        Ok(ids)
    }

    /// Recorded rounds, oldest first
    pub async fn rounds(&self) -> Result<Vec<Round>> {
        let pool = self.pool().await?;
        let rows = sqlx::query("SELECT theme_id, seconds_played, answers FROM rounds ORDER BY id")
            .fetch_all(pool)
            .await
            .map_err(DbError::SqlxError)?;

        let mut rounds = Vec::with_capacity(rows.len());
        for row in rows {
            let answers: String = row.try_get("answers").map_err(DbError::SqlxError)?;
            rounds.push(Round {
                theme_id: row.try_get("theme_id").map_err(DbError::SqlxError)?,
                seconds_played: row.try_get("seconds_played").map_err(DbError::SqlxError)?,
                answers: serde_json::from_str(&answers).map_err(DbError::Serialization)?,
            });
        }
        Ok(rounds)
    }
}

#[async_trait]
impl Persistence for Database {
    async fn migrate(&self) -> Result<()> {
        let pool = self.pool().await?;
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(DbError::MigrationError)?;
        Ok(())
    }

    async fn fetch_topics(&self) -> Result<Vec<Topic>> {
        let pool = self.pool().await?;
        let topics = load_topics(pool).await.map_err(DbError::SqlxError)?;
        Ok(topics)
    }

    async fn fetch_stats(&self) -> Result<Option<Stats>> {
        let pool = self.pool().await?;
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS rounds, COALESCE(SUM(seconds_played), 0) AS seconds
            FROM rounds
            "#,
        )
        .fetch_one(pool)
        .await
        .map_err(DbError::SqlxError)?;

        let rounds: i64 = row.try_get("rounds").map_err(DbError::SqlxError)?;
        if rounds == 0 {
            return Ok(None);
        }
        let seconds_played: i64 = row.try_get("seconds").map_err(DbError::SqlxError)?;
        Ok(Some(Stats { seconds_played }))
    }

    async fn record_round(&self, round: &Round) -> Result<()> {
        let pool = self.pool().await?;
        let answers = serde_json::to_string(&round.answers).map_err(DbError::Serialization)?;

        sqlx::query(
            r#"
            INSERT INTO rounds (theme_id, seconds_played, answers, played_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(round.theme_id)
        .bind(round.seconds_played)
        .bind(answers)
        .bind(chrono::Utc::now().timestamp())
        .execute(pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    async fn record_complaint(&self, question_id: i64) -> Result<()> {
        let pool = self.pool().await?;
        sqlx::query("INSERT INTO complaints (question_id, created_at) VALUES (?, ?)")
            .bind(question_id)
            .bind(chrono::Utc::now().timestamp())
            .execute(pool)
            .await
            .map_err(DbError::SqlxError)?;
        Ok(())
    }
}

/// Load the whole content tree, one query per table
async fn load_topics(pool: &SqlitePool) -> std::result::Result<Vec<Topic>, sqlx::Error> {
    let mut options: HashMap<i64, Vec<AnswerOption>> = HashMap::new();
    let rows = sqlx::query(
        "SELECT id, question_id, text, image, is_correct FROM options ORDER BY question_id, position, id",
    )
    .fetch_all(pool)
    .await?;
    for row in &rows {
        let option = option_from_row(row)?;
        options.entry(option.question_id).or_default().push(option);
    }

    let mut questions: HashMap<i64, Vec<Question>> = HashMap::new();
    let rows = sqlx::query(
        r#"
        SELECT id, theme_id, title, description, reference, difficulty
        FROM questions ORDER BY theme_id, position, id
        "#,
    )
    .fetch_all(pool)
    .await?;
    for row in &rows {
        let id: i64 = row.try_get("id")?;
        let theme_id: i64 = row.try_get("theme_id")?;
        let difficulty: i64 = row.try_get("difficulty")?;
        questions.entry(theme_id).or_default().push(Question {
            id,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            reference: row.try_get("reference")?,
            difficulty: Difficulty::from_level(difficulty),
            options: options.remove(&id).unwrap_or_default(),
        });
    }

    let mut themes: HashMap<i64, Vec<Theme>> = HashMap::new();
    let rows = sqlx::query("SELECT id, topic_id, title, image FROM themes ORDER BY topic_id, position, id")
        .fetch_all(pool)
        .await?;
    for row in &rows {
        let id: i64 = row.try_get("id")?;
        let topic_id: i64 = row.try_get("topic_id")?;
        themes.entry(topic_id).or_default().push(Theme {
            id,
            title: row.try_get("title")?,
            image: row.try_get("image")?,
            questions: questions.remove(&id).unwrap_or_default(),
        });
    }

    let rows = sqlx::query("SELECT id, title FROM topics ORDER BY position, id")
        .fetch_all(pool)
        .await?;
    let mut topics = Vec::with_capacity(rows.len());
    for row in &rows {
        let id: i64 = row.try_get("id")?;
        topics.push(Topic {
            id,
            title: row.try_get("title")?,
            themes: themes.remove(&id).unwrap_or_default(),
        });
    }
    Ok(topics)
}

fn option_from_row(row: &SqliteRow) -> std::result::Result<AnswerOption, sqlx::Error> {
    Ok(AnswerOption {
        id: row.try_get("id")?,
        question_id: row.try_get("question_id")?,
        text: row.try_get("text")?,
        image: row.try_get("image")?,
        is_correct: row.try_get("is_correct")?,
    })
}
