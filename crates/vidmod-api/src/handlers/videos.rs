use crate::auth::AuthContext;
use crate::error::{ApiResponse, ErrorBody, HttpAppError, ValidatedJson};
use crate::state::AppState;
use crate::utils::upload::extract_video_upload;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;
use vidmod_core::models::video::{DESCRIPTION_MAX_LEN, TITLE_MAX_LEN};
use vidmod_core::models::{
    parse_tags, ModerationStatus, NewVideo, PageQuery, Pagination, Permission, ProcessingJob,
    RoleName, Video, VideoMetadata, VideoStatus, VideoUpdate,
};
use vidmod_core::AppError;
use vidmod_storage::keys;

const VIDEO_NOT_FOUND: &str = "Video not found";

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoPayload {
    pub video: Video,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoListPayload {
    pub videos: Vec<Video>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreamPayload {
    pub stream_url: String,
    pub thumbnail_url: Option<String>,
    pub duration: Option<f64>,
    pub metadata: Option<VideoMetadata>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobPayload {
    pub job: ProcessingJob,
}

/// Tags as a comma separated string or a JSON array.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

impl TagsInput {
    fn into_tags(self) -> Vec<String> {
        match self {
            TagsInput::List(list) => list
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            TagsInput::Csv(raw) => parse_tags(&raw),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateVideoRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    pub tags: Option<TagsInput>,
    pub status: Option<VideoStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ModerateVideoRequest {
    pub status: ModerationStatus,
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

async fn load_video(state: &AppState, id: Uuid) -> Result<Video, HttpAppError> {
    state
        .db
        .videos
        .find_by_id(id)
        .await?
        .ok_or_else(|| HttpAppError(AppError::NotFound(VIDEO_NOT_FOUND.to_string())))
}

/// Best-effort removal of the source upload and every pipeline artifact.
async fn remove_files(state: &AppState, video: &Video) {
    if let Err(e) = state.storage.delete(&video.file_path).await {
        tracing::warn!(video_id = %video.id, error = %e, "Failed to delete source upload");
    }
    if let Err(e) = state
        .storage
        .delete_prefix(&keys::processed_prefix(video.id))
        .await
    {
        tracing::warn!(video_id = %video.id, error = %e, "Failed to delete processed artifacts");
    }
}

#[utoipa::path(
    post,
    path = "/api/videos",
    tag = "videos",
    request_body(content_type = "multipart/form-data", description = "Fields: video (file), title, description, tags, organizationId"),
    responses(
        (status = 201, description = "Video uploaded successfully", body = VideoPayload),
        (status = 400, description = "Missing file, missing title or rejected format", body = ErrorBody),
        (status = 403, description = "Missing video:create permission", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, ctx, multipart),
    fields(user_id = %ctx.user_id(), operation = "upload_video")
)]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_permission(&[Permission::VideoCreate])?;

    let form = extract_video_upload(multipart, &state.validator).await?;

    let file = form
        .file
        .ok_or_else(|| AppError::InvalidInput("Video file is required".to_string()))?;
    let title = form
        .title
        .ok_or_else(|| AppError::InvalidInput("Title is required".to_string()))?;
    if title.chars().count() > TITLE_MAX_LEN {
        return Err(AppError::InvalidInput(format!(
            "Title must be at most {} characters",
            TITLE_MAX_LEN
        ))
        .into());
    }
    if let Some(description) = &form.description {
        if description.chars().count() > DESCRIPTION_MAX_LEN {
            return Err(AppError::InvalidInput(format!(
                "Description must be at most {} characters",
                DESCRIPTION_MAX_LEN
            ))
            .into());
        }
    }
    state.validator.validate_file_size(file.data.len())?;

    if let Some(org_id) = form.organization_id {
        let organization = state
            .db
            .organizations
            .find_by_id(org_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organization not found".to_string()))?;
        if !organization.is_member(ctx.user_id()) {
            return Err(AppError::forbidden("Not a member of this organization").into());
        }
    }

    let file_size = file.data.len() as i64;
    let (file_path, _url) = state
        .storage
        .upload(&file.file_name, &file.content_type, file.data)
        .await?;

    let created = state
        .db
        .videos
        .create(NewVideo {
            title,
            description: form.description,
            file_name: file.file_name,
            file_path: file_path.clone(),
            file_size,
            uploaded_by: ctx.user_id(),
            organization_id: form.organization_id,
            tags: form.tags,
        })
        .await;

    let video = match created {
        Ok(video) => video,
        Err(e) => {
            if let Err(cleanup) = state.storage.delete(&file_path).await {
                tracing::warn!(file_path = %file_path, error = %cleanup, "Failed to remove orphaned upload");
            }
            return Err(e.into());
        }
    };

    // Processing failures never reach the uploader; the job record carries them
    if let Err(e) = state.queue.submit(video.id).await {
        tracing::warn!(video_id = %video.id, error = %format!("{:#}", e), "Video not queued for processing");
    }

    tracing::info!(video_id = %video.id, file_size, "Video uploaded");

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Video uploaded successfully", VideoPayload { video }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/videos",
    tag = "videos",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of videos, newest first", body = VideoListPayload),
        (status = 403, description = "Missing video:read permission", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_permission(&[Permission::VideoRead])?;
    let (videos, total) = state.db.videos.list(None, &page).await?;
    Ok(ApiResponse::data(VideoListPayload {
        videos,
        pagination: Pagination::new(&page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/api/videos/my-videos",
    tag = "videos",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of the caller's videos, newest first", body = VideoListPayload),
        (status = 403, description = "Missing video:read permission", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_videos(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_permission(&[Permission::VideoRead])?;
    let (videos, total) = state
        .db
        .videos
        .list(Some(ctx.user_id()), &page)
        .await?;
    Ok(ApiResponse::data(VideoListPayload {
        videos,
        pagination: Pagination::new(&page, total),
    }))
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}",
    tag = "videos",
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video found", body = VideoPayload),
        (status = 404, description = "Video not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_permission(&[Permission::VideoRead])?;
    let video = load_video(&state, id).await?;
    Ok(ApiResponse::data(VideoPayload { video }))
}

#[utoipa::path(
    put,
    path = "/api/videos/{id}",
    tag = "videos",
    params(("id" = Uuid, Path, description = "Video ID")),
    request_body = UpdateVideoRequest,
    responses(
        (status = 200, description = "Video updated successfully", body = VideoPayload),
        (status = 400, description = "Invalid field or status transition", body = ErrorBody),
        (status = 403, description = "Not the uploader", body = ErrorBody),
        (status = 404, description = "Video not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, ctx, payload),
    fields(user_id = %ctx.user_id(), video_id = %id, operation = "update_video")
)]
pub async fn update_video(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_permission(&[Permission::VideoUpdate])?;
    let video = load_video(&state, id).await?;

    if !video.is_owned_by(ctx.user_id()) {
        return Err(AppError::forbidden("Not authorized to update this video").into());
    }

    // Processing and completed belong to the pipeline; the owner may only give up on a
    // video that is still processing.
    let status = match payload.status {
        Some(next) if next == video.status => None,
        Some(next) if next.is_pipeline_managed() => {
            return Err(AppError::InvalidInput(format!(
                "Status {} is set by the processing pipeline",
                next
            ))
            .into());
        }
        Some(next) if !video.status.can_transition_to(next) => {
            return Err(AppError::InvalidInput(format!(
                "Invalid status transition from {} to {}",
                video.status, next
            ))
            .into());
        }
        other => other,
    };

    if let Some(next) = status {
        let moved = state.db.videos.set_status(id, video.status, next).await?;
        if !moved {
            return Err(AppError::Conflict(
                "Video status changed during the update, reload and retry".to_string(),
            )
            .into());
        }
        tracing::info!(from = %video.status, to = %next, "Video status changed by owner");
    }

    let update = VideoUpdate {
        title: payload.title.map(|t| t.trim().to_string()),
        description: payload.description,
        tags: payload.tags.map(TagsInput::into_tags),
    };

    let video = if update.is_empty() && status.is_none() {
        video
    } else if update.is_empty() {
        load_video(&state, id).await?
    } else {
        state
            .db
            .videos
            .update(id, update)
            .await?
            .ok_or_else(|| AppError::NotFound(VIDEO_NOT_FOUND.to_string()))?
    };

    Ok(ApiResponse::with_message(
        "Video updated successfully",
        VideoPayload { video },
    ))
}

#[utoipa::path(
    delete,
    path = "/api/videos/{id}",
    tag = "videos",
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Video deleted successfully"),
        (status = 403, description = "Not the uploader or missing video:delete", body = ErrorBody),
        (status = 404, description = "Video not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, ctx),
    fields(user_id = %ctx.user_id(), video_id = %id, operation = "delete_video")
)]
pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_permission(&[Permission::VideoDelete])?;
    let video = load_video(&state, id).await?;

    if !video.is_owned_by(ctx.user_id()) {
        return Err(AppError::forbidden("Not authorized to delete this video").into());
    }

    if !state.db.videos.delete(id).await? {
        return Err(AppError::NotFound(VIDEO_NOT_FOUND.to_string()).into());
    }
    remove_files(&state, &video).await;

    tracing::info!(video_id = %id, "Video deleted");
    Ok(ApiResponse::message("Video deleted successfully"))
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}/stream",
    tag = "videos",
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Stream location", body = StreamPayload),
        (status = 403, description = "Video rejected by moderation", body = ErrorBody),
        (status = 404, description = "Video not found or stream not available", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn stream_video(
    State(state): State<Arc<AppState>>,
    _ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video = load_video(&state, id).await?;

    if video.moderation_status == ModerationStatus::Rejected {
        return Err(AppError::forbidden("This video has been rejected by moderation").into());
    }

    let stream_path = video
        .stream_path
        .as_deref()
        .ok_or_else(|| AppError::NotFound("Stream not available".to_string()))?;

    Ok(ApiResponse::data(StreamPayload {
        stream_url: state.storage.public_url(stream_path),
        thumbnail_url: video
            .thumbnail_path
            .as_deref()
            .map(|p| state.storage.public_url(p)),
        duration: video.duration,
        metadata: video.metadata,
    }))
}

#[utoipa::path(
    put,
    path = "/api/videos/{id}/moderate",
    tag = "videos",
    params(("id" = Uuid, Path, description = "Video ID")),
    request_body = ModerateVideoRequest,
    responses(
        (status = 200, description = "Moderation status updated", body = VideoPayload),
        (status = 400, description = "Invalid moderation status", body = ErrorBody),
        (status = 403, description = "Caller is not an admin or moderator", body = ErrorBody),
        (status = 404, description = "Video not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, ctx, payload),
    fields(user_id = %ctx.user_id(), video_id = %id, operation = "moderate_video")
)]
pub async fn moderate_video(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ModerateVideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_role(&[RoleName::Admin, RoleName::Moderator])?;

    if payload.status == ModerationStatus::Pending {
        return Err(AppError::InvalidInput(
            "Status must be one of approved, rejected, flagged".to_string(),
        )
        .into());
    }

    let notes = payload
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let video = state
        .db
        .videos
        .set_moderation(id, payload.status, notes)
        .await?
        .ok_or_else(|| AppError::NotFound(VIDEO_NOT_FOUND.to_string()))?;

    tracing::info!(video_id = %id, verdict = %payload.status, "Moderation status overridden");

    Ok(ApiResponse::with_message(
        "Video moderation updated successfully",
        VideoPayload { video },
    ))
}

#[utoipa::path(
    get,
    path = "/api/videos/{id}/job",
    tag = "videos",
    params(("id" = Uuid, Path, description = "Video ID")),
    responses(
        (status = 200, description = "Latest processing job", body = JobPayload),
        (status = 404, description = "Video or job not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn video_job(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    ctx.require_permission(&[Permission::VideoRead])?;
    load_video(&state, id).await?;

    let job = state
        .db
        .jobs
        .latest_for_video(id)
        .await?
        .ok_or_else(|| AppError::NotFound("No processing job found for this video".to_string()))?;

    Ok(ApiResponse::data(JobPayload { job }))
}
