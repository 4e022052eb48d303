use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vidmod_core::models::{JobStatus, ProcessingJob};
use vidmod_core::AppError;

/// Durable processing-job records, kept apart from the video row.
#[async_trait::async_trait]
pub trait JobRepository: Send + Sync {
    /// Persist a queued job for `video_id`.
    async fn create(&self, video_id: Uuid) -> Result<ProcessingJob, AppError>;

    /// Mark running and bump the attempt counter.
    async fn mark_running(&self, id: Uuid) -> Result<(), AppError>;

    async fn mark_done(&self, id: Uuid) -> Result<(), AppError>;

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProcessingJob>, AppError>;

    async fn latest_for_video(&self, video_id: Uuid) -> Result<Option<ProcessingJob>, AppError>;

    /// Jobs still queued or running.
    async fn list_unfinished(&self) -> Result<Vec<ProcessingJob>, AppError>;
}

#[derive(Clone)]
pub struct PostgresJobRepository {
    pool: PgPool,
}

impl PostgresJobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn finish(&self, id: Uuid, status: JobStatus, error: Option<&str>) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE processing_jobs
            SET status = $2, error = $3, finished_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, job_id = %id, status = %status, "Failed to finish job");
            AppError::Database(e)
        })?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl JobRepository for PostgresJobRepository {
    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "processing_jobs",
        db.operation = "insert",
        video_id = %video_id
    ))]
    async fn create(&self, video_id: Uuid) -> Result<ProcessingJob, AppError> {
        let job = ProcessingJob::queued(video_id);
        sqlx::query_as::<Postgres, ProcessingJob>(
            r#"
            INSERT INTO processing_jobs (id, video_id, status, attempts, created_at, updated_at)
            VALUES ($1, $2, $3, 0, $4, $4)
            RETURNING *
            "#,
        )
        .bind(job.id)
        .bind(job.video_id)
        .bind(job.status)
        .bind(job.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, video_id = %video_id, "Failed to insert processing job");
            AppError::Database(e)
        })
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "processing_jobs",
        db.operation = "update",
        job_id = %id
    ))]
    async fn mark_running(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE processing_jobs
            SET status = $2, attempts = attempts + 1, started_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(JobStatus::Running)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, job_id = %id, "Failed to mark job running");
            AppError::Database(e)
        })?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "processing_jobs",
        db.operation = "update",
        job_id = %id
    ))]
    async fn mark_done(&self, id: Uuid) -> Result<(), AppError> {
        self.finish(id, JobStatus::Done, None).await
    }

    #[tracing::instrument(skip(self, error), fields(
        db.system = "postgresql",
        db.table = "processing_jobs",
        db.operation = "update",
        job_id = %id
    ))]
    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), AppError> {
        self.finish(id, JobStatus::Failed, Some(error)).await
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "processing_jobs",
        db.operation = "select",
        job_id = %id
    ))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProcessingJob>, AppError> {
        sqlx::query_as::<Postgres, ProcessingJob>("SELECT * FROM processing_jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, job_id = %id, "Failed to fetch job");
                AppError::Database(e)
            })
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "processing_jobs",
        db.operation = "select",
        video_id = %video_id
    ))]
    async fn latest_for_video(&self, video_id: Uuid) -> Result<Option<ProcessingJob>, AppError> {
        sqlx::query_as::<Postgres, ProcessingJob>(
            "SELECT * FROM processing_jobs WHERE video_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, video_id = %video_id, "Failed to fetch latest job");
            AppError::Database(e)
        })
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "processing_jobs",
        db.operation = "select"
    ))]
    async fn list_unfinished(&self) -> Result<Vec<ProcessingJob>, AppError> {
        sqlx::query_as::<Postgres, ProcessingJob>(
            "SELECT * FROM processing_jobs WHERE status IN ('queued', 'running') ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "Failed to list unfinished jobs");
            AppError::Database(e)
        })
    }
}
