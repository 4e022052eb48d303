use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use vidmod_core::models::{
    MemberRole, NewOrganization, Organization, OrganizationMember, OrganizationSettings,
    Subscription,
};
use vidmod_core::AppError;

use crate::db::organizations::OrganizationRepository;

#[derive(Clone, Default)]
pub struct InMemoryOrganizationRepository {
    organizations: Arc<RwLock<Vec<Organization>>>,
}

impl InMemoryOrganizationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl OrganizationRepository for InMemoryOrganizationRepository {
    async fn create(&self, org: NewOrganization) -> Result<Organization, AppError> {
        let mut organizations = self.organizations.write().await;
        if organizations
            .iter()
            .any(|o| o.slug == org.slug || o.name == org.name)
        {
            return Err(AppError::Conflict(
                "Organization with this name already exists".to_string(),
            ));
        }
        let now = Utc::now();
        let record = Organization {
            id: Uuid::new_v4(),
            name: org.name,
            slug: org.slug,
            description: org.description,
            owner_id: org.owner_id,
            members: vec![OrganizationMember {
                user_id: org.owner_id,
                role: MemberRole::Owner,
                joined_at: now,
            }],
            settings: OrganizationSettings::default(),
            subscription: Subscription::starting_at(now),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        organizations.push(record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        Ok(self
            .organizations
            .read()
            .await
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, AppError> {
        Ok(self
            .organizations
            .read()
            .await
            .iter()
            .find(|o| o.slug == slug)
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Organization>, AppError> {
        Ok(self
            .organizations
            .read()
            .await
            .iter()
            .rev()
            .filter(|o| o.is_owner(user_id) || o.is_member(user_id))
            .cloned()
            .collect())
    }

    async fn add_member(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<Option<Organization>, AppError> {
        let mut organizations = self.organizations.write().await;
        let Some(org) = organizations.iter_mut().find(|o| o.id == org_id) else {
            return Ok(None);
        };
        if org.is_member(user_id) {
            return Err(AppError::Conflict("User is already a member".to_string()));
        }
        let now = Utc::now();
        org.members.push(OrganizationMember {
            user_id,
            role,
            joined_at: now,
        });
        org.updated_at = now;
        Ok(Some(org.clone()))
    }

    async fn remove_member(&self, org_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut organizations = self.organizations.write().await;
        let Some(org) = organizations.iter_mut().find(|o| o.id == org_id) else {
            return Ok(false);
        };
        let before = org.members.len();
        org.members.retain(|m| m.user_id != user_id);
        let removed = org.members.len() < before;
        if removed {
            org.updated_at = Utc::now();
        }
        Ok(removed)
    }
}
