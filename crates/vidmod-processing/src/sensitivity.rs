//! Content sensitivity analysis.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use vidmod_core::models::{DetectedContent, SensitivityAnalysis, Video};

/// Terms that raise the text score. Each distinct hit adds [`TEXT_TERM_WEIGHT`].
pub const BANNED_TERMS: &[&str] = &["violence", "explicit", "inappropriate", "offensive"];
pub const TEXT_TERM_WEIGHT: u8 = 20;

const HIGH_SENSITIVITY_ABOVE: u8 = 70;
const REQUIRES_REVIEW_ABOVE: u8 = 80;

/// Score a title and description by substring matches against [`BANNED_TERMS`], clamped to 100.
pub fn text_sensitivity_score(title: &str, description: Option<&str>) -> u8 {
    let text = format!("{} {}", title, description.unwrap_or_default()).to_lowercase();
    let hits = BANNED_TERMS.iter().filter(|t| text.contains(*t)).count();
    (hits as u32 * TEXT_TERM_WEIGHT as u32).min(100) as u8
}

/// Build the analysis record for a content score.
///
/// Above 70 the video is flagged `high_sensitivity` and marked sensitive; above 80 it also
/// gets `requires_review`. Other categories are never set.
pub fn analysis_for_score(score: u8) -> SensitivityAnalysis {
    let score = score.min(100);
    let mut flags = Vec::new();
    let mut detected_content = DetectedContent::default();

    if score > HIGH_SENSITIVITY_ABOVE {
        flags.push("high_sensitivity".to_string());
        detected_content.sensitive = true;
    }
    if score > REQUIRES_REVIEW_ABOVE {
        flags.push("requires_review".to_string());
    }

    SensitivityAnalysis {
        score,
        flags,
        detected_content,
        analyzed_at: Utc::now(),
    }
}

/// Scores the content of an uploaded video.
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    async fn classify(&self, video: &Video) -> anyhow::Result<SensitivityAnalysis>;
}

/// Stand-in classifier: uniform random score in `0..100`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomContentClassifier;

#[async_trait]
impl ContentClassifier for RandomContentClassifier {
    async fn classify(&self, video: &Video) -> anyhow::Result<SensitivityAnalysis> {
        let score: u8 = rand::rng().random_range(0..100);
        tracing::debug!(video_id = %video.id, score, "Random content score assigned");
        Ok(analysis_for_score(score))
    }
}
