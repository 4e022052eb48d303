use crate::auth::models::AuthContext;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use vidmod_core::AppError;

pub const NO_TOKEN: &str = "Authentication required. No token provided.";
pub const INVALID_TOKEN: &str = "Invalid or expired token.";
pub const UNKNOWN_USER: &str = "User not found or token invalid.";
pub const ACCOUNT_INACTIVE: &str = "Account is inactive. Please contact support.";

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the bearer access token to an active user and attach an [`AuthContext`].
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(&request) {
        Some(token) => token,
        None => {
            tracing::debug!(path = %request.uri().path(), "Missing bearer token");
            return HttpAppError(AppError::Unauthorized(NO_TOKEN.to_string())).into_response();
        }
    };

    let claims = match state.tokens.verify_access(token) {
        Ok(claims) => claims,
        Err(_) => {
            return HttpAppError(AppError::Unauthorized(INVALID_TOKEN.to_string())).into_response();
        }
    };

    let user = match state.db.users.find_by_id(claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(user_id = %claims.sub, "Token subject no longer exists");
            return HttpAppError(AppError::Unauthorized(UNKNOWN_USER.to_string())).into_response();
        }
        Err(e) => return HttpAppError(e).into_response(),
    };

    if !user.is_active {
        return HttpAppError(AppError::forbidden(ACCOUNT_INACTIVE)).into_response();
    }

    tracing::debug!(user_id = %user.id, role = %user.role, "Request authenticated");
    request.extensions_mut().insert(AuthContext::new(user));

    next.run(request).await
}
