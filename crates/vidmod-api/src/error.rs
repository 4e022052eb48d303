//! HTTP response envelope and error conversion
//!
//! Every JSON response uses the same envelope: `{ success, message?, data? }` on success and
//! `{ success: false, message, errors?, stack? }` on failure.
//!
//! **Handler pattern:** return `Result<impl IntoResponse, HttpAppError>` and let `?` turn
//! `AppError` (or anything convertible into `HttpAppError`) into a rendered error.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};
use vidmod_core::{AppError, ErrorMetadata, LogLevel};
use vidmod_processing::ValidationError;
use vidmod_storage::StorageError;

/// Message returned for any upload rejected by the format allow-list.
pub const UPLOAD_REJECTED: &str = "Only video files are allowed";

/// Success envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Envelope carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Failure envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub errors: Option<serde_json::Value>,
    /// Error chain, only outside production and never for sensitive errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse.
/// Needed because of the orphan rule: IntoResponse and AppError both live in other crates.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

impl From<ValidationErrors> for HttpAppError {
    fn from(errors: ValidationErrors) -> Self {
        HttpAppError(AppError::InvalidInput(validation_message(&errors)))
    }
}

/// Field messages joined in field order, e.g. "Valid email is required".
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let messages: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();

    if messages.is_empty() {
        "Validation failed".to_string()
    } else {
        messages.join(", ")
    }
}

/// JSON body extractor that renders the error envelope (400) on malformed bodies and runs
/// `validator` rules on the parsed value.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        inner.validate()?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl HttpAppError {
    fn body(&self, include_stack: bool) -> ErrorBody {
        let app_error = &self.0;
        ErrorBody {
            success: false,
            message: app_error.client_message(),
            errors: app_error.details().cloned(),
            stack: (include_stack && !app_error.is_sensitive())
                .then(|| app_error.detailed_message()),
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.0);

        (status, Json(self.body(!is_production_env()))).into_response()
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::UploadFailed(msg)
            | StorageError::DownloadFailed(msg)
            | StorageError::DeleteFailed(msg) => AppError::Storage(msg),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app = match err {
            ValidationError::FileTooLarge { max, .. } => AppError::PayloadTooLarge(format!(
                "File too large. Maximum size is {} MB",
                max / 1024 / 1024
            )),
            ValidationError::InvalidExtension { .. }
            | ValidationError::InvalidContentType { .. }
            | ValidationError::MissingExtension(_) => AppError::InvalidInput(UPLOAD_REJECTED.to_string()),
            ValidationError::EmptyFile => AppError::InvalidInput("Video file is empty".to_string()),
        };
        HttpAppError(app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_from_storage_error_not_found() {
        let HttpAppError(app_err) = StorageError::NotFound("videos/a.mp4".to_string()).into();
        match app_err {
            AppError::NotFound(msg) => assert_eq!(msg, "videos/a.mp4"),
            _ => panic!("Expected NotFound variant"),
        }
    }

    #[test]
    fn test_from_storage_error_upload_failed() {
        let HttpAppError(app_err) = StorageError::UploadFailed("disk full".to_string()).into();
        match app_err {
            AppError::Storage(msg) => assert_eq!(msg, "disk full"),
            _ => panic!("Expected Storage variant"),
        }
    }

    #[test]
    fn test_from_validation_error_file_too_large() {
        let HttpAppError(app_err) = ValidationError::FileTooLarge {
            size: 200 * 1024 * 1024,
            max: 100 * 1024 * 1024,
        }
        .into();
        assert_eq!(app_err.http_status_code(), 413);
        assert!(app_err.client_message().contains("100 MB"));
    }

    #[test]
    fn test_from_validation_error_rejected_format() {
        let HttpAppError(app_err) = ValidationError::InvalidExtension {
            extension: "txt".to_string(),
            allowed: vec!["mp4".to_string()],
        }
        .into();
        assert_eq!(app_err.http_status_code(), 400);
        assert_eq!(app_err.client_message(), UPLOAD_REJECTED);
    }

    #[test]
    fn test_error_body_shape() {
        let err = HttpAppError(AppError::Forbidden {
            message: "You do not have permission to perform this action.".to_string(),
            details: Some(serde_json::json!({ "requiredPermissions": ["video:delete"] })),
        });
        let json = serde_json::to_value(err.body(true)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(
            json["message"],
            "You do not have permission to perform this action."
        );
        assert_eq!(json["errors"]["requiredPermissions"][0], "video:delete");
        assert!(json["stack"].as_str().is_some());
    }

    #[test]
    fn test_sensitive_error_has_no_stack() {
        let err = HttpAppError(AppError::Internal("connection reset".to_string()));
        let json = serde_json::to_value(err.body(true)).unwrap();
        assert_eq!(json["message"], "Internal Server Error");
        assert!(json.get("stack").is_none());
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::with_message("Done", 5)).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true, "message": "Done", "data": 5 }));

        let json = serde_json::to_value(ApiResponse::message("Logout successful")).unwrap();
        assert!(json.get("data").is_none());
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Signup {
        #[validate(email(message = "Valid email is required"))]
        email: String,
        #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
        password: String,
    }

    #[test]
    fn test_validation_message_lists_fields() {
        let errors = Signup {
            email: "nope".to_string(),
            password: "123".to_string(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            validation_message(&errors),
            "Valid email is required, Password must be at least 6 characters"
        );
    }
}
