//! Moderation pipeline: mark processing → text scan → content scan → verdict → transcode →
//! write back. Any failure moves the video to failed.

use anyhow::Context;
use std::sync::Arc;
use uuid::Uuid;
use vidmod_core::models::{ModerationStatus, ProcessingOutcome, VideoStatus};
use vidmod_db::VideoRepository;
use vidmod_storage::{keys, Storage};

use crate::sensitivity::{text_sensitivity_score, ContentClassifier};
use crate::transcoder::Transcoder;

/// How a run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Video completed with this verdict.
    Completed(ModerationStatus),
    /// Record was missing or not in uploading state when the run started.
    Skipped,
    /// Record was deleted or moved on while the run was in flight; results were dropped.
    Discarded,
}

pub struct ModerationPipeline {
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    classifier: Arc<dyn ContentClassifier>,
    transcoder: Arc<dyn Transcoder>,
}

impl ModerationPipeline {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        classifier: Arc<dyn ContentClassifier>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            videos,
            storage,
            classifier,
            transcoder,
        }
    }

    /// Run the pipeline once for `video_id`.
    ///
    /// On failure the video is moved processing → failed, its moderation status is left as is
    /// and the error is returned for the job record. There is no retry.
    #[tracing::instrument(skip(self), fields(video.id = %video_id))]
    pub async fn run(&self, video_id: Uuid) -> anyhow::Result<PipelineOutcome> {
        let started = self
            .videos
            .set_status(video_id, VideoStatus::Uploading, VideoStatus::Processing)
            .await
            .context("Failed to mark video processing")?;
        if !started {
            tracing::warn!(video_id = %video_id, "Video missing or not awaiting processing, skipping");
            return Ok(PipelineOutcome::Skipped);
        }

        match self.process(video_id).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracing::error!(video_id = %video_id, error = %format!("{:#}", err), "Video processing failed");
                match self
                    .videos
                    .set_status(video_id, VideoStatus::Processing, VideoStatus::Failed)
                    .await
                {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::warn!(video_id = %video_id, "Video gone before it could be marked failed")
                    }
                    Err(mark_err) => {
                        tracing::error!(video_id = %video_id, error = %mark_err, "Failed to mark video failed")
                    }
                }
                Err(err)
            }
        }
    }

    async fn process(&self, video_id: Uuid) -> anyhow::Result<PipelineOutcome> {
        let video = match self.videos.find_by_id(video_id).await? {
            Some(video) => video,
            None => return Ok(PipelineOutcome::Discarded),
        };

        let text_score = text_sensitivity_score(&video.title, video.description.as_deref());
        tracing::info!(video_id = %video_id, text_score, "Text sensitivity scored");

        let analysis = self
            .classifier
            .classify(&video)
            .await
            .context("Content classification failed")?;
        let verdict = ModerationStatus::from_score(analysis.score);
        tracing::info!(
            video_id = %video_id,
            content_score = analysis.score,
            verdict = %verdict,
            "Content sensitivity scored"
        );

        let output = self
            .transcoder
            .transcode(&video)
            .await
            .context("Transcoding failed")?;

        let stored = self
            .videos
            .complete_processing(
                video_id,
                ProcessingOutcome {
                    moderation_status: verdict,
                    sensitivity_analysis: analysis,
                    stream_path: output.stream_path,
                    thumbnail_path: output.thumbnail_path,
                    duration: output.duration,
                    metadata: output.metadata,
                },
            )
            .await
            .context("Failed to store processing result")?;

        if !stored {
            tracing::warn!(video_id = %video_id, "Video changed during processing, dropping artifacts");
            self.discard_artifacts(video_id).await;
            return Ok(PipelineOutcome::Discarded);
        }

        tracing::info!(video_id = %video_id, verdict = %verdict, "Video processing completed");
        Ok(PipelineOutcome::Completed(verdict))
    }

    async fn discard_artifacts(&self, video_id: Uuid) {
        if let Err(e) = self
            .storage
            .delete_prefix(&keys::processed_prefix(video_id))
            .await
        {
            tracing::warn!(video_id = %video_id, error = %e, "Failed to remove orphaned artifacts");
        }
    }
}
