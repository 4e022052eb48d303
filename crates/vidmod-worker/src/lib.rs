//! vidmod background processing
//!
//! A bounded in-process queue that runs moderation jobs, records each run as a
//! [`ProcessingJob`](vidmod_core::models::ProcessingJob) and recovers jobs left behind by a
//! previous process.

pub mod context;
pub mod queue;

pub use context::JobHandler;
pub use queue::{ProcessingQueue, ProcessingQueueConfig, INTERRUPTED_BY_RESTART, QUEUE_FULL};
