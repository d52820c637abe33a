//! Outbox job repository implementation.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::outbox::OutboxJob;

/// Repository for durable post-commit jobs.
#[derive(Debug, Clone)]
pub struct OutboxRepository {
    pool: PgPool,
}

impl OutboxRepository {
    /// Create a new outbox repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enqueue a job inside an open transaction, so the job commits or
    /// rolls back together with the mutation it follows.
    pub async fn enqueue_tx(
        &self,
        conn: &mut PgConnection,
        job_type: &str,
        payload: serde_json::Value,
        max_attempts: i32,
    ) -> AppResult<OutboxJob> {
        sqlx::query_as::<_, OutboxJob>(
            "INSERT INTO outbox_jobs (job_type, payload, max_attempts) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(job_type)
        .bind(payload)
        .bind(max_attempts)
        .fetch_one(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to enqueue job", e))
    }

    /// Claim the next pending job, oldest first, bumping its attempt
    /// counter. `FOR UPDATE SKIP LOCKED` keeps concurrent runners from
    /// double-claiming.
    pub async fn claim_next(&self) -> AppResult<Option<OutboxJob>> {
        sqlx::query_as::<_, OutboxJob>(
            "UPDATE outbox_jobs SET attempts = attempts + 1, updated_at = NOW() \
             WHERE id = ( \
                 SELECT id FROM outbox_jobs \
                 WHERE status = 'pending' \
                 ORDER BY created_at \
                 FOR UPDATE SKIP LOCKED \
                 LIMIT 1 \
             ) \
             RETURNING *",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim job", e))
    }

    /// Mark a job delivered.
    pub async fn mark_completed(&self, id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE outbox_jobs SET status = 'completed', updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to complete job", e))?;
        Ok(())
    }

    /// Record a delivery failure. The job stays pending until its
    /// attempts are exhausted, then flips to failed.
    pub async fn mark_attempt_failed(&self, id: Uuid, error: &str) -> AppResult<()> {
        sqlx::query(
            "UPDATE outbox_jobs SET \
                 status = CASE WHEN attempts >= max_attempts THEN 'failed'::outbox_status \
                               ELSE 'pending'::outbox_status END, \
                 last_error = $2, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record job failure", e))?;
        Ok(())
    }
}
