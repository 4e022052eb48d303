use std::path::Path;

/// Upload validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid file extension: {extension} (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("File has no extension: {0}")]
    MissingExtension(String),

    #[error("Empty file")]
    EmptyFile,
}

/// Video upload validator.
///
/// Format checks are substring matches: the lowercased extension and the lowercased MIME type
/// must each contain one of the allowed format tokens (`mp4`, `mov`, ...).
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
    allowed_formats: Vec<String>,
}

impl UploadValidator {
    pub fn new(max_file_size: usize, allowed_formats: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_formats: allowed_formats
                .into_iter()
                .map(|f| f.to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    fn matches_format(&self, value: &str) -> bool {
        self.allowed_formats.iter().any(|f| value.contains(f.as_str()))
    }

    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| ValidationError::MissingExtension(filename.to_string()))?;

        if !self.matches_format(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_formats.clone(),
            });
        }

        Ok(())
    }

    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        if !self.matches_format(&content_type.to_lowercase()) {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_formats.clone(),
            });
        }

        Ok(())
    }

    /// Name and MIME type checks, run before the body is read.
    pub fn validate_file(&self, filename: &str, content_type: &str) -> Result<(), ValidationError> {
        self.validate_extension(filename)?;
        self.validate_content_type(content_type)?;
        Ok(())
    }

    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        file_size: usize,
    ) -> Result<(), ValidationError> {
        self.validate_file(filename, content_type)?;
        self.validate_file_size(file_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidmod_core::config::VIDEO_FORMATS;

    fn validator() -> UploadValidator {
        UploadValidator::new(
            1024,
            VIDEO_FORMATS.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_accepts_video_files() {
        let v = validator();
        assert!(v.validate_all("clip.mp4", "video/mp4", 10).is_ok());
        assert!(v.validate_all("CLIP.MP4", "VIDEO/MP4", 10).is_ok());
        assert!(v.validate_all("old.avi", "video/avi", 10).is_ok());
        assert!(v.validate_all("movie.flv", "video/x-flv", 10).is_ok());
    }

    #[test]
    fn test_rejects_non_video_extension() {
        match validator().validate_file("notes.txt", "video/mp4") {
            Err(ValidationError::InvalidExtension { extension, .. }) => assert_eq!(extension, "txt"),
            _ => panic!("Expected InvalidExtension variant"),
        }
    }

    #[test]
    fn test_rejects_non_video_mime() {
        match validator().validate_file("clip.mp4", "text/plain") {
            Err(ValidationError::InvalidContentType { content_type, .. }) => {
                assert_eq!(content_type, "text/plain")
            }
            _ => panic!("Expected InvalidContentType variant"),
        }
    }

    #[test]
    fn test_mime_must_name_a_format() {
        // neither video/quicktime nor video/x-matroska contains a format token
        assert!(validator().validate_file("clip.mov", "video/quicktime").is_err());
        assert!(validator().validate_file("clip.mkv", "video/x-matroska").is_err());
    }

    #[test]
    fn test_missing_extension() {
        match validator().validate_file("clip", "video/mp4") {
            Err(ValidationError::MissingExtension(name)) => assert_eq!(name, "clip"),
            _ => panic!("Expected MissingExtension variant"),
        }
    }

    #[test]
    fn test_size_limits() {
        let v = validator();
        assert!(matches!(v.validate_file_size(0), Err(ValidationError::EmptyFile)));
        assert!(v.validate_file_size(1024).is_ok());
        match v.validate_file_size(1025) {
            Err(ValidationError::FileTooLarge { size, max }) => {
                assert_eq!(size, 1025);
                assert_eq!(max, 1024);
            }
            _ => panic!("Expected FileTooLarge variant"),
        }
    }
}
