//! Shared key generation for storage backends.

use std::path::Path;
use uuid::Uuid;

pub const UPLOAD_PREFIX: &str = "videos";
pub const PROCESSED_PREFIX: &str = "processed";

/// Key for a freshly uploaded source file. The original name only contributes its extension.
pub fn upload_key(original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()));

    match extension {
        Some(ext) => format!("{}/{}.{}", UPLOAD_PREFIX, Uuid::new_v4(), ext),
        None => format!("{}/{}", UPLOAD_PREFIX, Uuid::new_v4()),
    }
}

/// Directory holding every artifact produced for `video_id`.
pub fn processed_prefix(video_id: Uuid) -> String {
    format!("{}/{}", PROCESSED_PREFIX, video_id)
}

pub fn stream_key(video_id: Uuid) -> String {
    format!("{}/{}-stream.m3u8", processed_prefix(video_id), video_id)
}

pub fn thumbnail_key(video_id: Uuid) -> String {
    format!("{}/{}-thumb.jpg", processed_prefix(video_id), video_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_key_keeps_extension_only() {
        let key = upload_key("../../My Holiday.MP4");
        assert!(key.starts_with("videos/"));
        assert!(key.ends_with(".mp4"));
        assert!(!key.contains(".."));
        assert!(!key.contains(' '));
    }

    #[test]
    fn test_upload_key_without_extension() {
        let key = upload_key("clip");
        assert!(key.starts_with("videos/"));
        assert!(!key.contains('.'));
    }

    #[test]
    fn test_artifact_keys() {
        let id = Uuid::new_v4();
        assert_eq!(
            stream_key(id),
            format!("processed/{}/{}-stream.m3u8", id, id)
        );
        assert_eq!(thumbnail_key(id), format!("processed/{}/{}-thumb.jpg", id, id));
        assert!(stream_key(id).starts_with(&processed_prefix(id)));
    }
}
