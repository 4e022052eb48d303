use crate::constants::API_VERSION;
use crate::error::HttpAppError;
use axum::{response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;
use vidmod_core::AppError;

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    pub success: bool,
    pub message: &'static str,
    pub version: &'static str,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses((status = 200, description = "Service information", body = ServiceInfo))
)]
pub async fn root() -> impl IntoResponse {
    Json(ServiceInfo {
        success: true,
        message: "Video Processing API",
        version: API_VERSION,
    })
}

pub async fn not_found() -> HttpAppError {
    HttpAppError(AppError::NotFound("Route not found".to_string()))
}
