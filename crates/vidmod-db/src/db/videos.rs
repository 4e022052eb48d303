use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use vidmod_core::models::{
    ModerationStatus, NewVideo, PageQuery, ProcessingOutcome, Video, VideoStatus, VideoUpdate,
};
use vidmod_core::AppError;

/// Content record store.
///
/// Status writes are conditional: `set_status` and `complete_processing` only touch a row that
/// is still in the expected state, so a record deleted or moved on mid-run is left alone.
#[async_trait::async_trait]
pub trait VideoRepository: Send + Sync {
    /// Insert with status uploading and moderation pending.
    async fn create(&self, video: NewVideo) -> Result<Video, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Newest first. `uploaded_by` scopes the page to one owner.
    async fn list(
        &self,
        uploaded_by: Option<Uuid>,
        page: &PageQuery,
    ) -> Result<(Vec<Video>, i64), AppError>;

    /// Merge the provided fields. `None` when the record does not exist.
    async fn update(&self, id: Uuid, update: VideoUpdate) -> Result<Option<Video>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Move `from` → `to`. Returns false when the record is gone or not in `from`.
    async fn set_status(
        &self,
        id: Uuid,
        from: VideoStatus,
        to: VideoStatus,
    ) -> Result<bool, AppError>;

    /// Write the pipeline result and mark completed, guarded by `status = processing`.
    async fn complete_processing(
        &self,
        id: Uuid,
        outcome: ProcessingOutcome,
    ) -> Result<bool, AppError>;

    /// Override the verdict by hand.
    async fn set_moderation(
        &self,
        id: Uuid,
        status: ModerationStatus,
        notes: Option<String>,
    ) -> Result<Option<Video>, AppError>;
}

#[derive(Clone)]
pub struct PostgresVideoRepository {
    pool: PgPool,
}

impl PostgresVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VideoRepository for PostgresVideoRepository {
    #[tracing::instrument(skip(self, video), fields(
        db.system = "postgresql",
        db.table = "videos",
        db.operation = "insert"
    ))]
    async fn create(&self, video: NewVideo) -> Result<Video, AppError> {
        let now = Utc::now();
        sqlx::query_as::<Postgres, Video>(
            r#"
            INSERT INTO videos (
                id, title, description, file_name, file_path, file_size,
                status, moderation_status, uploaded_by, organization_id, tags,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.file_name)
        .bind(&video.file_path)
        .bind(video.file_size)
        .bind(VideoStatus::Uploading)
        .bind(ModerationStatus::Pending)
        .bind(video.uploaded_by)
        .bind(video.organization_id)
        .bind(&video.tags)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, uploaded_by = %video.uploaded_by, "Failed to insert video");
            AppError::Database(e)
        })
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "videos",
        db.operation = "select",
        db.record_id = %id
    ))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        sqlx::query_as::<Postgres, Video>("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, video_id = %id, "Failed to fetch video");
                AppError::Database(e)
            })
    }

    #[tracing::instrument(skip(self, page), fields(
        db.system = "postgresql",
        db.table = "videos",
        db.operation = "select"
    ))]
    async fn list(
        &self,
        uploaded_by: Option<Uuid>,
        page: &PageQuery,
    ) -> Result<(Vec<Video>, i64), AppError> {
        let videos = sqlx::query_as::<Postgres, Video>(
            r#"
            SELECT * FROM videos
            WHERE ($1::uuid IS NULL OR uploaded_by = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(uploaded_by)
        .bind(page.limit() as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "Failed to list videos");
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM videos WHERE ($1::uuid IS NULL OR uploaded_by = $1)",
        )
        .bind(uploaded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "Failed to count videos");
            AppError::Database(e)
        })?;

        Ok((videos, total))
    }

    #[tracing::instrument(skip(self, update), fields(
        db.system = "postgresql",
        db.table = "videos",
        db.operation = "update",
        db.record_id = %id
    ))]
    async fn update(&self, id: Uuid, update: VideoUpdate) -> Result<Option<Video>, AppError> {
        if update.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE videos SET updated_at = NOW()");
        if let Some(title) = update.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(description) = update.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(tags) = update.tags {
            builder.push(", tags = ").push_bind(tags);
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING *");

        builder
            .build_query_as::<Video>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, video_id = %id, "Failed to update video");
                AppError::Database(e)
            })
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "videos",
        db.operation = "delete",
        db.record_id = %id
    ))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, video_id = %id, "Failed to delete video");
                AppError::Database(e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "videos",
        db.operation = "update",
        db.record_id = %id
    ))]
    async fn set_status(
        &self,
        id: Uuid,
        from: VideoStatus,
        to: VideoStatus,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE videos SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, video_id = %id, from = %from, to = %to, "Failed to set video status");
            AppError::Database(e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, outcome), fields(
        db.system = "postgresql",
        db.table = "videos",
        db.operation = "update",
        db.record_id = %id
    ))]
    async fn complete_processing(
        &self,
        id: Uuid,
        outcome: ProcessingOutcome,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE videos SET
                status = $2,
                moderation_status = $3,
                sensitivity_analysis = $4,
                stream_path = $5,
                thumbnail_path = $6,
                duration = $7,
                metadata = $8,
                updated_at = NOW()
            WHERE id = $1 AND status = $9
            "#,
        )
        .bind(id)
        .bind(VideoStatus::Completed)
        .bind(outcome.moderation_status)
        .bind(Json(&outcome.sensitivity_analysis))
        .bind(&outcome.stream_path)
        .bind(&outcome.thumbnail_path)
        .bind(outcome.duration)
        .bind(Json(&outcome.metadata))
        .bind(VideoStatus::Processing)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, video_id = %id, "Failed to store processing outcome");
            AppError::Database(e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self, notes), fields(
        db.system = "postgresql",
        db.table = "videos",
        db.operation = "update",
        db.record_id = %id
    ))]
    async fn set_moderation(
        &self,
        id: Uuid,
        status: ModerationStatus,
        notes: Option<String>,
    ) -> Result<Option<Video>, AppError> {
        sqlx::query_as::<Postgres, Video>(
            r#"
            UPDATE videos
            SET moderation_status = $2, moderation_notes = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, video_id = %id, "Failed to set moderation status");
            AppError::Database(e)
        })
    }
}
