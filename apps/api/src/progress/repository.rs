//! Progress Repository: where task completion and streaks are stored.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::db::PersistenceError;
use crate::models::progress::{ProgressScope, ProgressSnapshot, Streak, TaskCategory, TaskKey};

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Returns an empty snapshot when nothing is stored for `scope`.
    async fn load(&self, scope: &ProgressScope) -> Result<ProgressSnapshot, PersistenceError>;

    /// Replaces everything stored for `scope` with `snapshot`.
    async fn save(
        &self,
        scope: &ProgressScope,
        snapshot: &ProgressSnapshot,
    ) -> Result<(), PersistenceError>;

    async fn delete(&self, scope: &ProgressScope) -> Result<(), PersistenceError>;

    /// Every scope that has stored tasks or a streak.
    async fn scopes(&self) -> Result<Vec<ProgressScope>, PersistenceError>;
}

#[derive(Clone)]
pub struct PgProgressRepository {
    pool: PgPool,
}

impl PgProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProgressRepository for PgProgressRepository {
    async fn load(&self, scope: &ProgressScope) -> Result<ProgressSnapshot, PersistenceError> {
        let rows: Vec<(i32, String, i32, bool)> = sqlx::query_as(
            r#"
            SELECT month_index, category, task_index, completed
            FROM progress_tasks
            WHERE user_id = $1 AND roadmap_id = $2
            "#,
        )
        .bind(&scope.user_id)
        .bind(scope.roadmap_id)
        .fetch_all(&self.pool)
        .await?;

        let mut snapshot = ProgressSnapshot::default();
        for (month_index, category, task_index, completed) in rows {
            let Ok(category) = category.parse::<TaskCategory>() else {
                warn!("Skipping progress row with unknown category '{category}'");
                continue;
            };
            let (Ok(month_index), Ok(task_index)) =
                (usize::try_from(month_index), usize::try_from(task_index))
            else {
                continue;
            };
            snapshot
                .tasks
                .insert(TaskKey::new(month_index, category, task_index), completed);
        }

        let streak: Option<(i32, Option<NaiveDate>)> = sqlx::query_as(
            "SELECT streak, last_completed_date FROM progress_streaks WHERE user_id = $1 AND roadmap_id = $2",
        )
        .bind(&scope.user_id)
        .bind(scope.roadmap_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((count, last_completed_date)) = streak {
            snapshot.streak = Streak {
                count: count.max(0) as u32,
                last_completed_date,
            };
        }

        Ok(snapshot)
    }

    async fn save(
        &self,
        scope: &ProgressScope,
        snapshot: &ProgressSnapshot,
    ) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM progress_tasks WHERE user_id = $1 AND roadmap_id = $2")
            .bind(&scope.user_id)
            .bind(scope.roadmap_id)
            .execute(&mut *tx)
            .await?;

        for (key, completed) in &snapshot.tasks {
            sqlx::query(
                r#"
                INSERT INTO progress_tasks
                    (user_id, roadmap_id, month_index, category, task_index, completed)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(&scope.user_id)
            .bind(scope.roadmap_id)
            .bind(key.month_index as i32)
            .bind(key.category.as_str())
            .bind(key.task_index as i32)
            .bind(*completed)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO progress_streaks (user_id, roadmap_id, streak, last_completed_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, roadmap_id)
            DO UPDATE SET streak = EXCLUDED.streak, last_completed_date = EXCLUDED.last_completed_date
            "#,
        )
        .bind(&scope.user_id)
        .bind(scope.roadmap_id)
        .bind(snapshot.streak.count as i32)
        .bind(snapshot.streak.last_completed_date)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, scope: &ProgressScope) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM progress_tasks WHERE user_id = $1 AND roadmap_id = $2")
            .bind(&scope.user_id)
            .bind(scope.roadmap_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM progress_streaks WHERE user_id = $1 AND roadmap_id = $2")
            .bind(&scope.user_id)
            .bind(scope.roadmap_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn scopes(&self) -> Result<Vec<ProgressScope>, PersistenceError> {
        let rows: Vec<(String, Uuid)> = sqlx::query_as(
            r#"
            SELECT user_id, roadmap_id FROM progress_tasks
            UNION
            SELECT user_id, roadmap_id FROM progress_streaks
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(user_id, roadmap_id)| ProgressScope::new(user_id, roadmap_id))
            .collect())
    }
}
