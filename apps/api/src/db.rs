//! Persistence Gateway: the document-store client for quiz submissions and roadmaps.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::quiz::AnswerRecord;
use crate::models::roadmap::{NewRoadmap, RoadmapRow};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("local storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Creates a PostgreSQL connection pool and applies pending migrations.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to apply database migrations")?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Write/read access to the quiz-submission and roadmap collections.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Stores a completed quiz and returns its id.
    async fn save_quiz_submission(&self, answers: &AnswerRecord) -> Result<Uuid, PersistenceError>;

    /// Stores a generated roadmap and returns its id.
    async fn save_roadmap(&self, roadmap: &NewRoadmap) -> Result<Uuid, PersistenceError>;

    /// All stored roadmaps, newest first.
    async fn list_roadmaps(&self) -> Result<Vec<RoadmapRow>, PersistenceError>;

    async fn get_roadmap(&self, id: Uuid) -> Result<Option<RoadmapRow>, PersistenceError>;

    /// Returns `false` when no roadmap had that id.
    async fn delete_roadmap(&self, id: Uuid) -> Result<bool, PersistenceError>;
}

#[derive(Clone)]
pub struct PgGateway {
    pool: PgPool,
}

impl PgGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersistenceGateway for PgGateway {
    async fn save_quiz_submission(&self, answers: &AnswerRecord) -> Result<Uuid, PersistenceError> {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO quiz_submissions (id, answers) VALUES ($1, $2)")
            .bind(id)
            .bind(Json(answers))
            .execute(&self.pool)
            .await?;
        info!("Saved quiz submission {id} ({} answers)", answers.len());
        Ok(id)
    }

    async fn save_roadmap(&self, roadmap: &NewRoadmap) -> Result<Uuid, PersistenceError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO roadmaps (id, quiz_id, career, current_skills, current_year, roadmap)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id)
        .bind(roadmap.quiz_id)
        .bind(&roadmap.career)
        .bind(&roadmap.current_skills)
        .bind(roadmap.current_year.label())
        .bind(Json(&roadmap.roadmap))
        .execute(&self.pool)
        .await?;
        info!("Saved roadmap {id} for career '{}'", roadmap.career);
        Ok(id)
    }

    async fn list_roadmaps(&self) -> Result<Vec<RoadmapRow>, PersistenceError> {
        Ok(
            sqlx::query_as::<_, RoadmapRow>("SELECT * FROM roadmaps ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn get_roadmap(&self, id: Uuid) -> Result<Option<RoadmapRow>, PersistenceError> {
        Ok(
            sqlx::query_as::<_, RoadmapRow>("SELECT * FROM roadmaps WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_roadmap(&self, id: Uuid) -> Result<bool, PersistenceError> {
        let result = sqlx::query("DELETE FROM roadmaps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
