//! vidmod processing library
//!
//! Upload validation and the moderation pipeline that turns an uploaded video into a
//! streamable, moderated one. Content analysis and transcoding sit behind the
//! [`ContentClassifier`] and [`Transcoder`] traits so real implementations can replace the
//! placeholder ones without touching the orchestration.

pub mod pipeline;
pub mod sensitivity;
pub mod transcoder;
pub mod validator;

// Re-export commonly used types
pub use pipeline::{ModerationPipeline, PipelineOutcome};
pub use sensitivity::{
    analysis_for_score, text_sensitivity_score, ContentClassifier, RandomContentClassifier,
};
pub use transcoder::{PlaceholderTranscoder, TranscodeOutput, Transcoder};
pub use validator::{UploadValidator, ValidationError};
