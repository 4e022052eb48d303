//! Transcoding capability and the placeholder implementation.

use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use vidmod_core::models::{Video, VideoMetadata};
use vidmod_storage::{keys, Storage};

/// Artifacts written by a transcoder. Paths are storage keys.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeOutput {
    pub stream_path: String,
    pub thumbnail_path: String,
    /// seconds
    pub duration: f64,
    pub metadata: VideoMetadata,
}

#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, video: &Video) -> anyhow::Result<TranscodeOutput>;
}

pub const PLACEHOLDER_MANIFEST: &str = "#EXTM3U
#EXT-X-VERSION:3
#EXT-X-TARGETDURATION:10
#EXT-X-MEDIA-SEQUENCE:0
#EXTINF:10.0,
segment-0.ts
#EXTINF:10.0,
segment-1.ts
#EXTINF:10.0,
segment-2.ts
#EXT-X-ENDLIST";

pub const PLACEHOLDER_THUMBNAIL: &[u8] = b"dummy-thumbnail";
pub const PLACEHOLDER_DURATION: f64 = 120.0;

/// Writes a fixed HLS manifest and thumbnail without touching the source file.
#[derive(Clone)]
pub struct PlaceholderTranscoder {
    storage: Arc<dyn Storage>,
}

impl PlaceholderTranscoder {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Transcoder for PlaceholderTranscoder {
    async fn transcode(&self, video: &Video) -> anyhow::Result<TranscodeOutput> {
        let stream_path = keys::stream_key(video.id);
        let thumbnail_path = keys::thumbnail_key(video.id);

        self.storage
            .upload_with_key(
                &stream_path,
                PLACEHOLDER_MANIFEST.as_bytes().to_vec(),
                "application/vnd.apple.mpegurl",
            )
            .await
            .with_context(|| format!("Failed to write stream manifest {}", stream_path))?;

        self.storage
            .upload_with_key(&thumbnail_path, PLACEHOLDER_THUMBNAIL.to_vec(), "image/jpeg")
            .await
            .with_context(|| format!("Failed to write thumbnail {}", thumbnail_path))?;

        tracing::debug!(
            video_id = %video.id,
            stream_path = %stream_path,
            "Placeholder stream written"
        );

        Ok(TranscodeOutput {
            stream_path,
            thumbnail_path,
            duration: PLACEHOLDER_DURATION,
            metadata: VideoMetadata {
                resolution: "1920x1080".to_string(),
                format: "mp4".to_string(),
                codec: None,
                bitrate: 5000,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;
    use uuid::Uuid;
    use vidmod_core::models::{ModerationStatus, VideoStatus};
    use vidmod_storage::LocalStorage;

    fn video() -> Video {
        let now = Utc::now();
        Video {
            id: Uuid::new_v4(),
            title: "Demo".to_string(),
            description: None,
            file_name: "demo.mp4".to_string(),
            file_path: "videos/demo.mp4".to_string(),
            file_size: 10,
            duration: None,
            thumbnail_path: None,
            stream_path: None,
            status: VideoStatus::Processing,
            moderation_status: ModerationStatus::Pending,
            moderation_notes: None,
            sensitivity_analysis: None,
            uploaded_by: Uuid::new_v4(),
            organization_id: None,
            tags: vec![],
            metadata: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_placeholder_output() {
        let dir = tempdir().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(dir.path(), "http://localhost/uploads".to_string())
                .await
                .unwrap(),
        );
        let video = video();

        let output = PlaceholderTranscoder::new(storage.clone())
            .transcode(&video)
            .await
            .unwrap();

        assert_eq!(
            output.stream_path,
            format!("processed/{}/{}-stream.m3u8", video.id, video.id)
        );
        assert_eq!(output.duration, 120.0);
        assert_eq!(output.metadata.resolution, "1920x1080");
        assert_eq!(output.metadata.bitrate, 5000);

        let manifest = storage.download(&output.stream_path).await.unwrap();
        let manifest = String::from_utf8(manifest).unwrap();
        assert!(manifest.starts_with("#EXTM3U"));
        assert!(manifest.ends_with("#EXT-X-ENDLIST"));
        assert_eq!(manifest.matches("#EXTINF:10.0,").count(), 3);

        let thumb = storage.download(&output.thumbnail_path).await.unwrap();
        assert_eq!(thumb, b"dummy-thumbnail");
        assert!(dir
            .path()
            .join(format!("processed/{}/{}-thumb.jpg", video.id, video.id))
            .exists());
    }
}
