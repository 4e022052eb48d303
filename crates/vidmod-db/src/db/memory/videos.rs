use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use vidmod_core::models::{
    ModerationStatus, NewVideo, PageQuery, ProcessingOutcome, Video, VideoStatus, VideoUpdate,
};
use vidmod_core::AppError;

use crate::db::videos::VideoRepository;

/// Records kept in insertion order; listing walks them newest first.
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<RwLock<Vec<Video>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create(&self, video: NewVideo) -> Result<Video, AppError> {
        let now = Utc::now();
        let record = Video {
            id: Uuid::new_v4(),
            title: video.title,
            description: video.description,
            file_name: video.file_name,
            file_path: video.file_path,
            file_size: video.file_size,
            duration: None,
            thumbnail_path: None,
            stream_path: None,
            status: VideoStatus::Uploading,
            moderation_status: ModerationStatus::Pending,
            moderation_notes: None,
            sensitivity_analysis: None,
            uploaded_by: video.uploaded_by,
            organization_id: video.organization_id,
            tags: video.tags,
            metadata: None,
            created_at: now,
            updated_at: now,
        };
        self.videos.write().await.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.videos.read().await.iter().find(|v| v.id == id).cloned())
    }

    async fn list(
        &self,
        uploaded_by: Option<Uuid>,
        page: &PageQuery,
    ) -> Result<(Vec<Video>, i64), AppError> {
        let videos = self.videos.read().await;
        let matching: Vec<&Video> = videos
            .iter()
            .rev()
            .filter(|v| uploaded_by.map_or(true, |owner| v.uploaded_by == owner))
            .collect();
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn update(&self, id: Uuid, update: VideoUpdate) -> Result<Option<Video>, AppError> {
        let mut videos = self.videos.write().await;
        let Some(video) = videos.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        if update.is_empty() {
            return Ok(Some(video.clone()));
        }
        if let Some(title) = update.title {
            video.title = title;
        }
        if let Some(description) = update.description {
            video.description = Some(description);
        }
        if let Some(tags) = update.tags {
            video.tags = tags;
        }
        video.updated_at = Utc::now();
        Ok(Some(video.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut videos = self.videos.write().await;
        let before = videos.len();
        videos.retain(|v| v.id != id);
        Ok(videos.len() < before)
    }

    async fn set_status(
        &self,
        id: Uuid,
        from: VideoStatus,
        to: VideoStatus,
    ) -> Result<bool, AppError> {
        let mut videos = self.videos.write().await;
        match videos.iter_mut().find(|v| v.id == id && v.status == from) {
            Some(video) => {
                video.status = to;
                video.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn complete_processing(
        &self,
        id: Uuid,
        outcome: ProcessingOutcome,
    ) -> Result<bool, AppError> {
        let mut videos = self.videos.write().await;
        let Some(video) = videos
            .iter_mut()
            .find(|v| v.id == id && v.status == VideoStatus::Processing)
        else {
            return Ok(false);
        };
        video.status = VideoStatus::Completed;
        video.moderation_status = outcome.moderation_status;
        video.sensitivity_analysis = Some(outcome.sensitivity_analysis);
        video.stream_path = Some(outcome.stream_path);
        video.thumbnail_path = Some(outcome.thumbnail_path);
        video.duration = Some(outcome.duration);
        video.metadata = Some(outcome.metadata);
        video.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_moderation(
        &self,
        id: Uuid,
        status: ModerationStatus,
        notes: Option<String>,
    ) -> Result<Option<Video>, AppError> {
        let mut videos = self.videos.write().await;
        let Some(video) = videos.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        video.moderation_status = status;
        video.moderation_notes = notes;
        video.updated_at = Utc::now();
        Ok(Some(video.clone()))
    }
}
