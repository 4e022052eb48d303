//! Job handler trait
//!
//! The queue only knows video ids; the handler decides what processing a video gets.

use async_trait::async_trait;
use uuid::Uuid;
use vidmod_processing::{ModerationPipeline, PipelineOutcome};

#[async_trait]
pub trait JobHandler: Send + Sync {
    /// Process one video. An error marks the job failed with its message.
    async fn handle(&self, video_id: Uuid) -> anyhow::Result<()>;
}

#[async_trait]
impl JobHandler for ModerationPipeline {
    async fn handle(&self, video_id: Uuid) -> anyhow::Result<()> {
        match self.run(video_id).await? {
            PipelineOutcome::Completed(verdict) => {
                tracing::debug!(video_id = %video_id, verdict = %verdict, "Job handled");
            }
            PipelineOutcome::Skipped | PipelineOutcome::Discarded => {
                tracing::debug!(video_id = %video_id, "Job produced no result");
            }
        }
        Ok(())
    }
}
