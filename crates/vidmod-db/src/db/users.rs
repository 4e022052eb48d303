use chrono::Utc;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;
use vidmod_core::models::{normalize_email, NewUser, User};
use vidmod_core::AppError;

use super::map_write_error;

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Fails with a conflict when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Lookup is case-insensitive.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Store or clear the single live refresh token.
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip(self, user), fields(
        db.system = "postgresql",
        db.table = "users",
        db.operation = "insert"
    ))]
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let now = Utc::now();
        sqlx::query_as::<Postgres, User>(
            r#"
            INSERT INTO users (
                id, first_name, last_name, email, password_hash, role,
                is_active, is_email_verified, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(normalize_email(&user.email))
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.is_email_verified)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "Failed to insert user");
            map_write_error(e, "Email already registered")
        })
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "users",
        db.operation = "select",
        db.record_id = %id
    ))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        sqlx::query_as::<Postgres, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, user_id = %id, "Failed to fetch user");
                AppError::Database(e)
            })
    }

    #[tracing::instrument(skip(self, email), fields(
        db.system = "postgresql",
        db.table = "users",
        db.operation = "select"
    ))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<Postgres, User>("SELECT * FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to fetch user by email");
                AppError::Database(e)
            })
    }

    #[tracing::instrument(skip(self, token), fields(
        db.system = "postgresql",
        db.table = "users",
        db.operation = "update",
        db.record_id = %id
    ))]
    async fn set_refresh_token(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, user_id = %id, "Failed to update refresh token");
                AppError::Database(e)
            })?;
        Ok(())
    }
}
