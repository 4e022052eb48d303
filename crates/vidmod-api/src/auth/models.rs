use crate::error::HttpAppError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde_json::json;
use uuid::Uuid;
use vidmod_core::models::{Permission, Role, RoleName, User};
use vidmod_core::AppError;

pub const AUTHENTICATION_REQUIRED: &str = "Authentication required.";
pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";
pub const ROLE_DENIED: &str = "You do not have the required role to perform this action.";

/// Authenticated caller, placed in request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,
    pub role: Role,
}

impl AuthContext {
    pub fn new(user: User) -> Self {
        let role = Role::from(user.role);
        Self { user, role }
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn role_name(&self) -> RoleName {
        self.role.name
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.permissions.contains(&permission)
    }

    /// Passes when the role grants at least one of `permissions`.
    pub fn require_permission(&self, permissions: &[Permission]) -> Result<(), AppError> {
        if permissions.iter().any(|p| self.has_permission(*p)) {
            return Ok(());
        }
        Err(AppError::Forbidden {
            message: PERMISSION_DENIED.to_string(),
            details: Some(json!({
                "requiredPermissions": permissions.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            })),
        })
    }

    pub fn require_role(&self, roles: &[RoleName]) -> Result<(), AppError> {
        if roles.contains(&self.role.name) {
            return Ok(());
        }
        Err(AppError::Forbidden {
            message: ROLE_DENIED.to_string(),
            details: Some(json!({
                "requiredRoles": roles.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
                "yourRole": self.role.name.to_string(),
            })),
        })
    }
}

// Extension cannot be combined with Multipart, so the context is read from parts directly
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| HttpAppError(AppError::Unauthorized(AUTHENTICATION_REQUIRED.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vidmod_core::ErrorMetadata;

    fn context(role: RoleName) -> AuthContext {
        let now = Utc::now();
        AuthContext::new(User {
            id: Uuid::new_v4(),
            first_name: "Sam".to_string(),
            last_name: "Doe".to_string(),
            email: "sam@example.com".to_string(),
            password_hash: String::new(),
            role,
            is_active: true,
            is_email_verified: false,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        })
    }

    #[test]
    fn test_require_permission_any_of() {
        let ctx = context(RoleName::User);
        assert!(ctx.require_permission(&[Permission::VideoRead]).is_ok());
        assert!(ctx
            .require_permission(&[Permission::VideoDelete, Permission::VideoUpdate])
            .is_ok());
    }

    #[test]
    fn test_require_permission_denied_lists_required() {
        let ctx = context(RoleName::User);
        let err = ctx.require_permission(&[Permission::VideoDelete]).unwrap_err();
        assert_eq!(err.http_status_code(), 403);
        assert_eq!(err.client_message(), PERMISSION_DENIED);
        assert_eq!(
            err.details().unwrap()["requiredPermissions"],
            json!(["video:delete"])
        );
    }

    #[test]
    fn test_require_role() {
        let ctx = context(RoleName::Moderator);
        assert!(ctx.require_role(&[RoleName::Admin, RoleName::Moderator]).is_ok());

        let err = ctx.require_role(&[RoleName::Admin]).unwrap_err();
        assert_eq!(err.client_message(), ROLE_DENIED);
        let details = err.details().unwrap();
        assert_eq!(details["requiredRoles"], json!(["admin"]));
        assert_eq!(details["yourRole"], "moderator");
    }

    #[test]
    fn test_admin_passes_everything() {
        let ctx = context(RoleName::Admin);
        for permission in Permission::ALL {
            assert!(ctx.require_permission(&[permission]).is_ok());
        }
    }
}
