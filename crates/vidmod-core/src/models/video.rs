use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

pub const TITLE_MAX_LEN: usize = 200;
pub const DESCRIPTION_MAX_LEN: usize = 1000;

/// Lifecycle stage of the upload/processing pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "video_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Uploading,
    Processing,
    Completed,
    Failed,
}

impl VideoStatus {
    /// Only uploading → processing → {completed | failed} is allowed.
    pub fn can_transition_to(&self, next: VideoStatus) -> bool {
        matches!(
            (self, next),
            (VideoStatus::Uploading, VideoStatus::Processing)
                | (VideoStatus::Processing, VideoStatus::Completed)
                | (VideoStatus::Processing, VideoStatus::Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, VideoStatus::Completed | VideoStatus::Failed)
    }

    /// Statuses only the processing pipeline may enter. Completed always comes with the
    /// stream path written in the same update.
    pub fn is_pipeline_managed(&self) -> bool {
        matches!(self, VideoStatus::Processing | VideoStatus::Completed)
    }
}

impl Display for VideoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            VideoStatus::Uploading => write!(f, "uploading"),
            VideoStatus::Processing => write!(f, "processing"),
            VideoStatus::Completed => write!(f, "completed"),
            VideoStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Verdict on content acceptability, independent of processing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "moderation_status", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
    Flagged,
}

/// Scores below this are approved.
pub const APPROVE_BELOW: u8 = 30;
/// Scores at or above this are rejected.
pub const REJECT_AT: u8 = 70;

impl ModerationStatus {
    /// Verdict for a sensitivity score: `< 30` approved, `>= 70` rejected, flagged otherwise.
    pub fn from_score(score: u8) -> Self {
        if score < APPROVE_BELOW {
            ModerationStatus::Approved
        } else if score >= REJECT_AT {
            ModerationStatus::Rejected
        } else {
            ModerationStatus::Flagged
        }
    }
}

impl Display for ModerationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ModerationStatus::Pending => write!(f, "pending"),
            ModerationStatus::Approved => write!(f, "approved"),
            ModerationStatus::Rejected => write!(f, "rejected"),
            ModerationStatus::Flagged => write!(f, "flagged"),
        }
    }
}

impl FromStr for ModerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            "flagged" => Ok(ModerationStatus::Flagged),
            other => Err(format!("Unknown moderation status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DetectedContent {
    pub violence: bool,
    pub adult: bool,
    pub offensive: bool,
    pub sensitive: bool,
}

/// Result of the content sensitivity scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityAnalysis {
    /// 0..=100
    pub score: u8,
    pub flags: Vec<String>,
    pub detected_content: DetectedContent,
    pub analyzed_at: DateTime<Utc>,
}

/// Technical metadata reported by the transcoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VideoMetadata {
    pub resolution: String,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    /// kbps
    pub bitrate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    /// Storage key of the uploaded source file.
    pub file_path: String,
    pub file_size: i64,
    pub duration: Option<f64>,
    pub thumbnail_path: Option<String>,
    pub stream_path: Option<String>,
    pub status: VideoStatus,
    pub moderation_status: ModerationStatus,
    pub moderation_notes: Option<String>,
    pub sensitivity_analysis: Option<SensitivityAnalysis>,
    pub uploaded_by: Uuid,
    pub organization_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub metadata: Option<VideoMetadata>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.uploaded_by == user_id
    }
}

#[cfg(feature = "sqlx")]
impl sqlx::FromRow<'_, sqlx::postgres::PgRow> for Video {
    fn from_row(row: &sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::types::Json;
        use sqlx::Row;

        let sensitivity_analysis: Option<Json<SensitivityAnalysis>> =
            row.try_get("sensitivity_analysis")?;
        let metadata: Option<Json<VideoMetadata>> = row.try_get("metadata")?;

        Ok(Video {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            file_name: row.try_get("file_name")?,
            file_path: row.try_get("file_path")?,
            file_size: row.try_get("file_size")?,
            duration: row.try_get("duration")?,
            thumbnail_path: row.try_get("thumbnail_path")?,
            stream_path: row.try_get("stream_path")?,
            status: row.try_get("status")?,
            moderation_status: row.try_get("moderation_status")?,
            moderation_notes: row.try_get("moderation_notes")?,
            sensitivity_analysis: sensitivity_analysis.map(|j| j.0),
            uploaded_by: row.try_get("uploaded_by")?,
            organization_id: row.try_get("organization_id")?,
            tags: row.try_get("tags")?,
            metadata: metadata.map(|j| j.0),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Input for a freshly uploaded video. Status starts at uploading, moderation at pending.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub title: String,
    pub description: Option<String>,
    pub file_name: String,
    pub file_path: String,
    pub file_size: i64,
    pub uploaded_by: Uuid,
    pub organization_id: Option<Uuid>,
    pub tags: Vec<String>,
}

/// Partial update from the owner. `None` leaves the field untouched.
///
/// Status is not part of it: status only moves through the conditional
/// `VideoRepository::set_status`.
#[derive(Debug, Clone, Default)]
pub struct VideoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl VideoUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.tags.is_none()
    }
}

/// Everything the pipeline writes back when a run completes.
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    pub moderation_status: ModerationStatus,
    pub sensitivity_analysis: SensitivityAnalysis,
    pub stream_path: String,
    pub thumbnail_path: String,
    pub duration: f64,
    pub metadata: VideoMetadata,
}

/// Split a comma separated tag list, trimming blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_boundaries() {
        assert_eq!(ModerationStatus::from_score(0), ModerationStatus::Approved);
        assert_eq!(ModerationStatus::from_score(29), ModerationStatus::Approved);
        assert_eq!(ModerationStatus::from_score(30), ModerationStatus::Flagged);
        assert_eq!(ModerationStatus::from_score(69), ModerationStatus::Flagged);
        assert_eq!(ModerationStatus::from_score(70), ModerationStatus::Rejected);
        assert_eq!(ModerationStatus::from_score(100), ModerationStatus::Rejected);
    }

    #[test]
    fn test_verdict_covers_every_score() {
        for score in 0..=100u8 {
            let verdict = ModerationStatus::from_score(score);
            let expected = match score {
                0..=29 => ModerationStatus::Approved,
                30..=69 => ModerationStatus::Flagged,
                _ => ModerationStatus::Rejected,
            };
            assert_eq!(verdict, expected, "score {}", score);
            assert_ne!(verdict, ModerationStatus::Pending);
        }
    }

    #[test]
    fn test_status_transitions() {
        use VideoStatus::*;
        assert!(Uploading.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));

        assert!(!Uploading.can_transition_to(Completed));
        assert!(!Uploading.can_transition_to(Failed));
        assert!(!Processing.can_transition_to(Uploading));
        assert!(!Completed.can_transition_to(Processing));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Completed));
    }

    #[test]
    fn test_pipeline_managed_statuses() {
        assert!(VideoStatus::Processing.is_pipeline_managed());
        assert!(VideoStatus::Completed.is_pipeline_managed());
        assert!(!VideoStatus::Failed.is_pipeline_managed());
        assert!(!VideoStatus::Uploading.is_pipeline_managed());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(VideoStatus::Completed.is_terminal());
        assert!(VideoStatus::Failed.is_terminal());
        assert!(!VideoStatus::Uploading.is_terminal());
        assert!(!VideoStatus::Processing.is_terminal());
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags(" demo, travel ,,music "),
            vec!["demo".to_string(), "travel".to_string(), "music".to_string()]
        );
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_sensitivity_analysis_serializes_camel_case() {
        let analysis = SensitivityAnalysis {
            score: 75,
            flags: vec!["high_sensitivity".to_string()],
            detected_content: DetectedContent {
                sensitive: true,
                ..Default::default()
            },
            analyzed_at: Utc::now(),
        };
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["score"], 75);
        assert_eq!(json["detectedContent"]["sensitive"], true);
        assert!(json.get("analyzedAt").is_some());
    }

    #[test]
    fn test_moderation_status_parse() {
        assert_eq!(
            "flagged".parse::<ModerationStatus>().unwrap(),
            ModerationStatus::Flagged
        );
        assert!("maybe".parse::<ModerationStatus>().is_err());
    }
}
