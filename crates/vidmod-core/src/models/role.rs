use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

/// Atomic capability checked by the access gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    #[serde(rename = "video:create")]
    VideoCreate,
    #[serde(rename = "video:read")]
    VideoRead,
    #[serde(rename = "video:update")]
    VideoUpdate,
    #[serde(rename = "video:delete")]
    VideoDelete,
    #[serde(rename = "user:read")]
    UserRead,
    #[serde(rename = "user:update")]
    UserUpdate,
    #[serde(rename = "user:delete")]
    UserDelete,
    #[serde(rename = "role:manage")]
    RoleManage,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::VideoCreate,
        Permission::VideoRead,
        Permission::VideoUpdate,
        Permission::VideoDelete,
        Permission::UserRead,
        Permission::UserUpdate,
        Permission::UserDelete,
        Permission::RoleManage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::VideoCreate => "video:create",
            Permission::VideoRead => "video:read",
            Permission::VideoUpdate => "video:update",
            Permission::VideoDelete => "video:delete",
            Permission::UserRead => "user:read",
            Permission::UserUpdate => "user:update",
            Permission::UserDelete => "user:delete",
            Permission::RoleManage => "role:manage",
        }
    }
}

impl Display for Permission {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

const ADMIN_PERMISSIONS: &[Permission] = &Permission::ALL;

const CONTRIBUTOR_PERMISSIONS: &[Permission] = &[
    Permission::VideoCreate,
    Permission::VideoRead,
    Permission::VideoUpdate,
    Permission::UserRead,
];

const MODERATOR_PERMISSIONS: &[Permission] = &[
    Permission::VideoCreate,
    Permission::VideoRead,
    Permission::VideoUpdate,
    Permission::VideoDelete,
    Permission::UserRead,
];

/// Built-in role names. Every user holds exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "role_name", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    Admin,
    User,
    Moderator,
    Editor,
}

impl RoleName {
    /// Permission set granted to this role.
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            RoleName::Admin => ADMIN_PERMISSIONS,
            RoleName::User | RoleName::Editor => CONTRIBUTOR_PERMISSIONS,
            RoleName::Moderator => MODERATOR_PERMISSIONS,
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    /// True when the role grants at least one of `permissions`.
    pub fn has_any_permission(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.has_permission(*p))
    }

    pub fn description(&self) -> &'static str {
        match self {
            RoleName::Admin => "Full access to all resources",
            RoleName::User => "Default user role",
            RoleName::Moderator => "Can review and remove uploaded content",
            RoleName::Editor => "Can create and edit content",
        }
    }
}

impl Display for RoleName {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RoleName::Admin => write!(f, "admin"),
            RoleName::User => write!(f, "user"),
            RoleName::Moderator => write!(f, "moderator"),
            RoleName::Editor => write!(f, "editor"),
        }
    }
}

impl FromStr for RoleName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(RoleName::Admin),
            "user" => Ok(RoleName::User),
            "moderator" => Ok(RoleName::Moderator),
            "editor" => Ok(RoleName::Editor),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// Role with its description and permission set, as shown to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Role {
    pub name: RoleName,
    pub description: String,
    pub permissions: Vec<Permission>,
}

impl From<RoleName> for Role {
    fn from(name: RoleName) -> Self {
        Self {
            name,
            description: name.description().to_string(),
            permissions: name.permissions().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_has_every_permission() {
        for permission in Permission::ALL {
            assert!(RoleName::Admin.has_permission(permission));
        }
    }

    #[test]
    fn test_user_and_editor_permissions() {
        for role in [RoleName::User, RoleName::Editor] {
            assert!(role.has_permission(Permission::VideoCreate));
            assert!(role.has_permission(Permission::VideoRead));
            assert!(role.has_permission(Permission::VideoUpdate));
            assert!(role.has_permission(Permission::UserRead));
            assert!(!role.has_permission(Permission::VideoDelete));
            assert!(!role.has_permission(Permission::RoleManage));
        }
    }

    #[test]
    fn test_moderator_can_delete_videos() {
        assert!(RoleName::Moderator.has_permission(Permission::VideoDelete));
        assert!(!RoleName::Moderator.has_permission(Permission::UserDelete));
    }

    #[test]
    fn test_has_any_permission() {
        assert!(RoleName::User.has_any_permission(&[Permission::VideoDelete, Permission::VideoRead]));
        assert!(!RoleName::User.has_any_permission(&[Permission::VideoDelete, Permission::RoleManage]));
        assert!(!RoleName::Admin.has_any_permission(&[]));
    }

    #[test]
    fn test_permission_serialization() {
        let json = serde_json::to_string(&Permission::VideoCreate).unwrap();
        assert_eq!(json, "\"video:create\"");
        let parsed: Permission = serde_json::from_str("\"role:manage\"").unwrap();
        assert_eq!(parsed, Permission::RoleManage);
    }

    #[test]
    fn test_role_name_roundtrip() {
        for role in [
            RoleName::Admin,
            RoleName::User,
            RoleName::Moderator,
            RoleName::Editor,
        ] {
            assert_eq!(role.to_string().parse::<RoleName>().unwrap(), role);
        }
        assert!("superuser".parse::<RoleName>().is_err());
    }
}
