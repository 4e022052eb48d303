use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::OnceLock;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "member_role", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Owner,
    Admin,
    #[default]
    Member,
    Viewer,
}

impl Display for MemberRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MemberRole::Owner => write!(f, "owner"),
            MemberRole::Admin => write!(f, "admin"),
            MemberRole::Member => write!(f, "member"),
            MemberRole::Viewer => write!(f, "viewer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMember {
    pub user_id: Uuid,
    pub role: MemberRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSettings {
    pub max_storage_gb: u32,
    /// seconds
    pub max_video_length: u32,
    pub allowed_formats: Vec<String>,
    pub moderation_enabled: bool,
    pub streaming_enabled: bool,
}

impl Default for OrganizationSettings {
    fn default() -> Self {
        Self {
            max_storage_gb: 10,
            max_video_length: 3600,
            allowed_formats: ["mp4", "mov", "avi", "mkv"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            moderation_enabled: true,
            streaming_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionPlan {
    #[default]
    Free,
    Basic,
    Pro,
    Enterprise,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn starting_at(start_date: DateTime<Utc>) -> Self {
        Self {
            plan: SubscriptionPlan::default(),
            status: SubscriptionStatus::default(),
            start_date,
            end_date: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub members: Vec<OrganizationMember>,
    pub settings: OrganizationSettings,
    pub subscription: Subscription,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn disallowed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9-]").expect("static regex"))
}

/// URL-safe slug: lowercase, whitespace runs become `-`, anything outside `[a-z0-9-]` is dropped.
pub fn slugify(name: &str) -> String {
    let lower = name.to_lowercase();
    let dashed = whitespace_re().replace_all(&lower, "-");
    disallowed_re().replace_all(&dashed, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Acme Studios"), "acme-studios");
        assert_eq!(slugify("  Café   Crew!! "), "-caf-crew-");
        assert_eq!(slugify("Team_42 & Co."), "team42--co");
        assert_eq!(slugify("already-slugged"), "already-slugged");
    }

    #[test]
    fn test_default_settings() {
        let settings = OrganizationSettings::default();
        assert_eq!(settings.max_storage_gb, 10);
        assert_eq!(settings.max_video_length, 3600);
        assert_eq!(settings.allowed_formats, vec!["mp4", "mov", "avi", "mkv"]);
        assert!(settings.moderation_enabled);
        assert!(settings.streaming_enabled);
    }

    #[test]
    fn test_membership_checks() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let now = Utc::now();
        let org = Organization {
            id: Uuid::new_v4(),
            name: "Acme".to_string(),
            slug: "acme".to_string(),
            description: None,
            owner_id: owner,
            members: vec![
                OrganizationMember {
                    user_id: owner,
                    role: MemberRole::Owner,
                    joined_at: now,
                },
                OrganizationMember {
                    user_id: member,
                    role: MemberRole::Member,
                    joined_at: now,
                },
            ],
            settings: OrganizationSettings::default(),
            subscription: Subscription::starting_at(now),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(org.is_owner(owner));
        assert!(!org.is_owner(member));
        assert!(org.is_member(member));
        assert!(!org.is_member(Uuid::new_v4()));
    }

    #[test]
    fn test_member_role_default() {
        assert_eq!(MemberRole::default(), MemberRole::Member);
    }
}
