use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use vidmod_core::models::{JobStatus, ProcessingJob};
use vidmod_core::AppError;

use crate::db::jobs::JobRepository;

#[derive(Clone, Default)]
pub struct InMemoryJobRepository {
    jobs: Arc<RwLock<HashMap<Uuid, ProcessingJob>>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a job as-is, e.g. one left behind by an earlier process.
    pub async fn insert(&self, job: ProcessingJob) {
        self.jobs.write().await.insert(job.id, job);
    }

    async fn finish(&self, id: Uuid, status: JobStatus, error: Option<&str>) {
        if let Some(job) = self.jobs.write().await.get_mut(&id) {
            let now = Utc::now();
            job.status = status;
            job.error = error.map(String::from);
            job.finished_at = Some(now);
            job.updated_at = now;
        }
    }
}

#[async_trait::async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, video_id: Uuid) -> Result<ProcessingJob, AppError> {
        let job = ProcessingJob::queued(video_id);
        self.jobs.write().await.insert(job.id, job.clone());
        Ok(job)
    }

    async fn mark_running(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(job) = self.jobs.write().await.get_mut(&id) {
            let now = Utc::now();
            job.status = JobStatus::Running;
            job.attempts += 1;
            job.started_at = Some(now);
            job.updated_at = now;
        }
        Ok(())
    }

    async fn mark_done(&self, id: Uuid) -> Result<(), AppError> {
        self.finish(id, JobStatus::Done, None).await;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, error: &str) -> Result<(), AppError> {
        self.finish(id, JobStatus::Failed, Some(error)).await;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProcessingJob>, AppError> {
        Ok(self.jobs.read().await.get(&id).cloned())
    }

    async fn latest_for_video(&self, video_id: Uuid) -> Result<Option<ProcessingJob>, AppError> {
        Ok(self
            .jobs
            .read()
            .await
            .values()
            .filter(|j| j.video_id == video_id)
            .max_by_key(|j| j.created_at)
            .cloned())
    }

    async fn list_unfinished(&self) -> Result<Vec<ProcessingJob>, AppError> {
        let mut jobs: Vec<ProcessingJob> = self
            .jobs
            .read()
            .await
            .values()
            .filter(|j| !j.status.is_finished())
            .cloned()
            .collect();
        jobs.sort_by_key(|j| j.created_at);
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_job_lifecycle() {
        let repo = InMemoryJobRepository::new();
        let video_id = Uuid::new_v4();
        let job = repo.create(video_id).await.unwrap();
        assert_eq!(repo.list_unfinished().await.unwrap().len(), 1);

        repo.mark_running(job.id).await.unwrap();
        let running = repo.find_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(running.status, JobStatus::Running);
        assert_eq!(running.attempts, 1);
        assert!(running.started_at.is_some());

        repo.mark_failed(job.id, "boom").await.unwrap();
        let failed = repo.latest_for_video(video_id).await.unwrap().unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        assert_eq!(failed.error.as_deref(), Some("boom"));
        assert!(failed.finished_at.is_some());
        assert!(repo.list_unfinished().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_done_clears_error() {
        let repo = InMemoryJobRepository::new();
        let job = repo.create(Uuid::new_v4()).await.unwrap();
        repo.mark_running(job.id).await.unwrap();
        repo.mark_done(job.id).await.unwrap();

        let done = repo.find_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(done.status, JobStatus::Done);
        assert!(done.error.is_none());
    }
}
