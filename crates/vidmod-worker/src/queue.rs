//! Processing queue: bounded channel, worker pool, job records and startup recovery.
//!
//! Shutdown: [`ProcessingQueue::shutdown`] stops the pool from taking new jobs. Jobs already
//! running finish on their own; anything still buffered is picked up by
//! [`ProcessingQueue::recover_stuck_jobs`] on the next start.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use uuid::Uuid;

use vidmod_core::Config;
use vidmod_core::models::{ProcessingJob, VideoStatus};
use vidmod_db::{JobRepository, VideoRepository};

use crate::context::JobHandler;

/// Error stored on jobs that were queued or running when the process stopped.
pub const INTERRUPTED_BY_RESTART: &str = "interrupted by restart";

/// Error stored on jobs rejected because the channel was full.
pub const QUEUE_FULL: &str = "processing queue is full";

#[derive(Debug, Clone)]
pub struct ProcessingQueueConfig {
    pub max_concurrent: usize,
    pub queue_size: usize,
    pub recover_on_startup: bool,
}

impl Default for ProcessingQueueConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            queue_size: 1000,
            recover_on_startup: true,
        }
    }
}

impl From<&Config> for ProcessingQueueConfig {
    fn from(config: &Config) -> Self {
        Self {
            max_concurrent: config.processing_max_concurrent(),
            queue_size: config.processing_queue_size(),
            ..Self::default()
        }
    }
}

/// Move a video that will not be processed to failed, going through processing when it never
/// left uploading. Returns false when the video is already terminal or gone.
async fn fail_video(videos: &dyn VideoRepository, video_id: Uuid) -> Result<bool> {
    if videos
        .set_status(video_id, VideoStatus::Processing, VideoStatus::Failed)
        .await?
    {
        return Ok(true);
    }
    if !videos
        .set_status(video_id, VideoStatus::Uploading, VideoStatus::Processing)
        .await?
    {
        return Ok(false);
    }
    Ok(videos
        .set_status(video_id, VideoStatus::Processing, VideoStatus::Failed)
        .await?)
}

#[derive(Debug, Clone, Copy)]
struct QueuedJob {
    job_id: Uuid,
    video_id: Uuid,
}

#[derive(Clone)]
pub struct ProcessingQueue {
    jobs: Arc<dyn JobRepository>,
    videos: Arc<dyn VideoRepository>,
    sender: mpsc::Sender<QueuedJob>,
    shutdown_tx: mpsc::Sender<()>,
}

impl ProcessingQueue {
    /// Recover leftovers (when configured) and spawn the worker pool.
    pub async fn start(
        jobs: Arc<dyn JobRepository>,
        videos: Arc<dyn VideoRepository>,
        handler: Arc<dyn JobHandler>,
        config: ProcessingQueueConfig,
    ) -> Result<Self> {
        let (sender, receiver) = mpsc::channel(config.queue_size.max(1));
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let queue = Self {
            jobs: jobs.clone(),
            videos,
            sender,
            shutdown_tx,
        };

        if config.recover_on_startup {
            queue.recover_stuck_jobs().await?;
        }

        tokio::spawn(async move {
            Self::worker_pool(jobs, handler, config, receiver, shutdown_rx).await;
        });

        Ok(queue)
    }

    /// Persist a queued job for `video_id` and hand it to the pool.
    ///
    /// When the channel is full the job is recorded as failed, the video moves to failed
    /// and an error is returned. The upload that triggered it stays in place.
    #[tracing::instrument(skip(self), fields(video.id = %video_id))]
    pub async fn submit(&self, video_id: Uuid) -> Result<ProcessingJob> {
        let job = self.jobs.create(video_id).await.map_err(|e| {
            tracing::error!(error = %e, video_id = %video_id, "Failed to create processing job");
            anyhow::anyhow!("Failed to create processing job: {}", e)
        })?;

        let queued = QueuedJob {
            job_id: job.id,
            video_id,
        };

        if let Err(err) = self.sender.try_send(queued) {
            let reason = match err {
                mpsc::error::TrySendError::Full(_) => QUEUE_FULL,
                mpsc::error::TrySendError::Closed(_) => "processing queue is closed",
            };
            tracing::warn!(job_id = %job.id, video_id = %video_id, reason, "Processing job rejected");

            if let Err(e) = self.jobs.mark_failed(job.id, reason).await {
                tracing::error!(error = %e, job_id = %job.id, "Failed to mark rejected job failed");
            }
            if let Err(e) = fail_video(self.videos.as_ref(), video_id).await {
                tracing::error!(error = %e, video_id = %video_id, "Failed to mark video failed");
            }
            return Err(anyhow::anyhow!("{}", reason));
        }

        tracing::info!(job_id = %job.id, video_id = %video_id, "Processing job submitted");
        Ok(job)
    }

    /// Fail every queued or running job left by an earlier process and move its video out of
    /// the in-flight states. Returns the number of jobs recovered.
    #[tracing::instrument(skip(self))]
    pub async fn recover_stuck_jobs(&self) -> Result<usize> {
        let stuck = self
            .jobs
            .list_unfinished()
            .await
            .context("Failed to list unfinished jobs")?;

        for job in &stuck {
            self.jobs
                .mark_failed(job.id, INTERRUPTED_BY_RESTART)
                .await
                .with_context(|| format!("Failed to mark job {} failed", job.id))?;

            let moved = fail_video(self.videos.as_ref(), job.video_id)
                .await
                .context("Failed to fail interrupted video")?;

            tracing::debug!(job_id = %job.id, video_id = %job.video_id, video_failed = moved, "Recovered job");
        }

        if stuck.is_empty() {
            tracing::debug!("No interrupted processing jobs");
        } else {
            tracing::warn!(count = stuck.len(), "Recovered interrupted processing jobs");
        }

        Ok(stuck.len())
    }

    /// Stop taking jobs off the channel. Does not wait for running jobs.
    pub async fn shutdown(&self) {
        tracing::info!("Initiating processing queue shutdown");
        let _ = self.shutdown_tx.send(()).await;
    }

    async fn worker_pool(
        jobs: Arc<dyn JobRepository>,
        handler: Arc<dyn JobHandler>,
        config: ProcessingQueueConfig,
        mut receiver: mpsc::Receiver<QueuedJob>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!(
            max_concurrent = config.max_concurrent,
            queue_size = config.queue_size,
            "Processing worker pool started"
        );

        let semaphore = Arc::new(Semaphore::new(config.max_concurrent.max(1)));

        loop {
            // Only pull a job once a slot is free so the channel stays the backlog.
            let permit = tokio::select! {
                _ = shutdown_rx.recv() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let queued = tokio::select! {
                _ = shutdown_rx.recv() => break,
                queued = receiver.recv() => match queued {
                    Some(queued) => queued,
                    None => break,
                },
            };

            let jobs = jobs.clone();
            let handler = handler.clone();
            tokio::spawn(async move {
                let _permit = permit;
                Self::process_job(queued, jobs, handler).await;
            });
        }

        tracing::info!("Processing worker pool stopped");
    }

    #[tracing::instrument(
        skip(jobs, handler),
        fields(job.id = %queued.job_id, video.id = %queued.video_id, job.status = tracing::field::Empty)
    )]
    async fn process_job(queued: QueuedJob, jobs: Arc<dyn JobRepository>, handler: Arc<dyn JobHandler>) {
        if let Err(e) = jobs.mark_running(queued.job_id).await {
            tracing::error!(error = %e, "Failed to mark job running");
        }

        let span = tracing::Span::current();
        let start = std::time::Instant::now();

        match handler.handle(queued.video_id).await {
            Ok(()) => {
                span.record("job.status", "done");
                if let Err(e) = jobs.mark_done(queued.job_id).await {
                    tracing::error!(error = %e, "Failed to mark job done");
                }
                tracing::info!(
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Processing job finished"
                );
            }
            Err(err) => {
                span.record("job.status", "failed");
                let message = format!("{:#}", err);
                if let Err(e) = jobs.mark_failed(queued.job_id, &message).await {
                    tracing::error!(error = %e, "Failed to mark job failed");
                }
                tracing::error!(
                    error = %message,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Processing job failed"
                );
            }
        }
    }
}
