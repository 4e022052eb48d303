//! Health check handler.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns "healthy", "timeout", or "unhealthy: {error}".
async fn run_check<F, E>(timeout: Duration, f: F) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("unhealthy: {}", e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    pub status: String,
    /// `in-memory` when no database is configured.
    pub database: String,
    pub storage: String,
    pub environment: String,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "service",
    responses(
        (status = 200, description = "Service healthy", body = HealthCheckResponse),
        (status = 503, description = "A dependency is unhealthy", body = HealthCheckResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match state.db.pool.clone() {
        Some(pool) => {
            run_check(CHECK_TIMEOUT, async move {
                sqlx::query("SELECT 1").execute(&pool).await.map(drop)
            })
            .await
        }
        None => "in-memory".to_string(),
    };

    let storage = state.storage.clone();
    let storage = run_check(CHECK_TIMEOUT, async move {
        storage.exists("health-check-non-existent-key").await.map(drop)
    })
    .await;

    let healthy = (database == "healthy" || database == "in-memory") && storage == "healthy";
    if !healthy {
        tracing::error!(database = %database, storage = %storage, "Health check failed");
    }

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthCheckResponse {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            database,
            storage,
            environment: state.config.environment().to_string(),
        }),
    )
}
