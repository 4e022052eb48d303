use crate::auth::middleware::ACCOUNT_INACTIVE;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::AuthContext;
use crate::error::{ApiResponse, ErrorBody, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use utoipa::ToSchema;
use validator::Validate;
use vidmod_core::models::{normalize_email, NewUser, RoleName, UserResponse};
use vidmod_core::AppError;

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[serde(default)]
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenPayload {
    pub access_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProfilePayload {
    pub user: UserResponse,
}

fn secure_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthPayload),
        (status = 400, description = "Validation failed or email already registered", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state, payload), fields(operation = "register"))]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let password_hash = hash_password(payload.password).await?;

    let user = state
        .db
        .users
        .create(NewUser {
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            email: normalize_email(&payload.email),
            password_hash,
            role: RoleName::User,
            is_active: true,
            is_email_verified: false,
        })
        .await?;

    let tokens = state.tokens.issue_pair(&user)?;
    state
        .db
        .users
        .set_refresh_token(user.id, Some(&tokens.refresh_token))
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "User registered successfully",
            AuthPayload {
                user: UserResponse::from(&user),
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
            },
        ),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthPayload),
        (status = 401, description = "Invalid email or password", body = ErrorBody),
        (status = 403, description = "Account is inactive", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state, payload), fields(operation = "login"))]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let user = state
        .db
        .users
        .find_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !verify_password(payload.password, user.password_hash.clone()).await? {
        tracing::debug!(user_id = %user.id, "Password mismatch");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()).into());
    }

    if !user.is_active {
        return Err(AppError::forbidden(ACCOUNT_INACTIVE).into());
    }

    let tokens = state.tokens.issue_pair(&user)?;
    state
        .db
        .users
        .set_refresh_token(user.id, Some(&tokens.refresh_token))
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(ApiResponse::with_message(
        "Login successful",
        AuthPayload {
            user: UserResponse::from(&user).with_permissions(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        },
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "Authentication required", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, HttpAppError> {
    state.db.users.set_refresh_token(ctx.user_id(), None).await?;
    tracing::info!(user_id = %ctx.user_id(), "User logged out");
    Ok(ApiResponse::message("Logout successful"))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh-token",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Token refreshed successfully", body = AccessTokenPayload),
        (status = 400, description = "Refresh token is required", body = ErrorBody),
        (status = 401, description = "Invalid refresh token", body = ErrorBody)
    )
)]
#[tracing::instrument(skip(state, payload), fields(operation = "refresh_token"))]
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let presented = payload
        .ok()
        .and_then(|Json(body)| body.refresh_token)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("Refresh token is required".to_string()))?;

    let claims = state
        .tokens
        .verify_refresh(&presented)
        .map_err(|_| AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()))?;

    let user = state
        .db
        .users
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()))?;

    let matches = user
        .refresh_token
        .as_deref()
        .map(|stored| secure_compare(stored, &presented))
        .unwrap_or(false);
    if !matches {
        tracing::debug!(user_id = %user.id, "Refresh token does not match the stored one");
        return Err(AppError::Unauthorized(INVALID_REFRESH_TOKEN.to_string()).into());
    }

    if !user.is_active {
        return Err(AppError::forbidden(ACCOUNT_INACTIVE).into());
    }

    let access_token = state.tokens.issue_access(&user)?;
    Ok(ApiResponse::with_message(
        "Token refreshed successfully",
        AccessTokenPayload { access_token },
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = ProfilePayload),
        (status = 401, description = "Authentication required", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn profile(ctx: AuthContext) -> Result<impl IntoResponse, HttpAppError> {
    let user = UserResponse::from(&ctx.user)
        .with_permissions()
        .with_email_verified(ctx.user.is_email_verified);
    Ok(ApiResponse::data(ProfilePayload { user }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_compare() {
        assert!(secure_compare("abc", "abc"));
        assert!(!secure_compare("abc", "abd"));
        assert!(!secure_compare("abc", "abcd"));
    }

    #[test]
    fn test_register_validation_messages() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "firstName": "Ada",
            "email": "ada@example.com",
            "password": "123"
        }))
        .unwrap();
        let errors = request.validate().unwrap_err();
        let message = crate::error::validation_message(&errors);
        assert!(message.contains("Last name is required"));
        assert!(message.contains("Password must be at least 6 characters"));
        assert!(!message.contains("Valid email is required"));
    }
}
