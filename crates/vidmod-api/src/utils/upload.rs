//! Multipart parsing for video uploads

use crate::error::HttpAppError;
use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use uuid::Uuid;
use vidmod_core::models::parse_tags;
use vidmod_core::AppError;
use vidmod_processing::{UploadValidator, ValidationError};

/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "video";

#[derive(Debug)]
pub struct UploadedFile {
    pub data: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
}

/// Parsed upload form. Text fields other than the known ones are ignored.
#[derive(Debug, Default)]
pub struct VideoUploadForm {
    pub file: Option<UploadedFile>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub organization_id: Option<Uuid>,
}

fn multipart_error(err: MultipartError) -> HttpAppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return HttpAppError(AppError::PayloadTooLarge(
            "Request body exceeds the upload limit".to_string(),
        ));
    }
    HttpAppError(AppError::InvalidInput(format!(
        "Failed to read multipart: {}",
        err.body_text()
    )))
}

/// Strip any directory components a client sent along with the name.
fn client_file_name(raw: &str) -> String {
    std::path::Path::new(raw)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or("upload")
        .to_string()
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Read the upload form. The file's name and type are checked before its bytes are buffered,
/// and buffering stops as soon as the size limit is crossed.
pub async fn extract_video_upload(
    mut multipart: Multipart,
    validator: &UploadValidator,
) -> Result<VideoUploadForm, HttpAppError> {
    let mut form = VideoUploadForm::default();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            FILE_FIELD => {
                if form.file.is_some() {
                    return Err(HttpAppError(AppError::InvalidInput(
                        "Only one video file may be uploaded per request".to_string(),
                    )));
                }
                let file_name = client_file_name(field.file_name().unwrap_or_default());
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();

                validator.validate_file(&file_name, &content_type)?;

                let mut data = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    data.extend_from_slice(&chunk);
                    if data.len() > validator.max_file_size() {
                        return Err(ValidationError::FileTooLarge {
                            size: data.len(),
                            max: validator.max_file_size(),
                        }
                        .into());
                    }
                }

                form.file = Some(UploadedFile {
                    data,
                    file_name,
                    content_type,
                });
            }
            "title" => form.title = non_blank(field.text().await.map_err(multipart_error)?),
            "description" => {
                form.description = non_blank(field.text().await.map_err(multipart_error)?)
            }
            "tags" => form.tags = parse_tags(&field.text().await.map_err(multipart_error)?),
            "organizationId" => {
                if let Some(raw) = non_blank(field.text().await.map_err(multipart_error)?) {
                    let id = Uuid::parse_str(&raw).map_err(|_| {
                        HttpAppError(AppError::InvalidInput(
                            "Invalid organization id".to_string(),
                        ))
                    })?;
                    form.organization_id = Some(id);
                }
            }
            other => {
                tracing::debug!(field = %other, "Ignoring unknown upload field");
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_file_name_strips_directories() {
        assert_eq!(client_file_name("clip.mp4"), "clip.mp4");
        assert_eq!(client_file_name("../../etc/clip.mp4"), "clip.mp4");
        assert_eq!(client_file_name("/tmp/a/b.mov"), "b.mov");
        assert_eq!(client_file_name(""), "upload");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  Demo ".to_string()), Some("Demo".to_string()));
        assert_eq!(non_blank("   ".to_string()), None);
    }
}
