use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use vidmod_core::models::{normalize_email, NewUser, User};
use vidmod_core::AppError;

use crate::db::users::UserRepository;

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let email = normalize_email(&user.email);
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        let now = Utc::now();
        let record = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            email,
            password_hash: user.password_hash,
            role: user.role,
            is_active: user.is_active,
            is_email_verified: user.is_email_verified,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = normalize_email(email);
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.refresh_token = token.map(String::from);
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidmod_core::models::RoleName;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: RoleName::User,
            is_active: true,
            is_email_verified: false,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let repo = InMemoryUserRepository::new();
        repo.create(new_user("grace@example.com")).await.unwrap();

        match repo.create(new_user(" Grace@Example.com")).await {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, "Email already registered"),
            _ => panic!("Expected Conflict variant"),
        }
        assert_eq!(repo.users.read().await.len(), 1);
    }

    #[tokio::test]
    async fn test_find_by_email_is_case_insensitive() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("grace@example.com")).await.unwrap();
        let found = repo.find_by_email("GRACE@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn test_refresh_token_set_and_clear() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("grace@example.com")).await.unwrap();

        repo.set_refresh_token(user.id, Some("r1")).await.unwrap();
        let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("r1"));

        repo.set_refresh_token(user.id, None).await.unwrap();
        let stored = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert!(stored.refresh_token.is_none());
    }
}
