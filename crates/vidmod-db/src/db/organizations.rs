use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres};
use std::collections::HashMap;
use uuid::Uuid;
use vidmod_core::models::{
    MemberRole, NewOrganization, Organization, OrganizationMember, OrganizationSettings,
    Subscription,
};
use vidmod_core::AppError;

use super::map_write_error;

const DUPLICATE_NAME: &str = "Organization with this name already exists";

#[async_trait::async_trait]
pub trait OrganizationRepository: Send + Sync {
    /// Insert with default settings and subscription; the owner becomes the first member.
    async fn create(&self, org: NewOrganization) -> Result<Organization, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, AppError>;

    /// Organizations the user owns or belongs to, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Organization>, AppError>;

    /// `None` when the organization does not exist.
    async fn add_member(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<Option<Organization>, AppError>;

    /// Returns false when the user was not a member.
    async fn remove_member(&self, org_id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
}

#[derive(FromRow)]
struct OrganizationRow {
    id: Uuid,
    name: String,
    slug: String,
    description: Option<String>,
    owner_id: Uuid,
    settings: Json<OrganizationSettings>,
    subscription: Json<Subscription>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn into_organization(self, members: Vec<OrganizationMember>) -> Organization {
        Organization {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            owner_id: self.owner_id,
            members,
            settings: self.settings.0,
            subscription: self.subscription.0,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct MemberRow {
    organization_id: Uuid,
    user_id: Uuid,
    role: MemberRole,
    joined_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PostgresOrganizationRepository {
    pool: PgPool,
}

impl PostgresOrganizationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach members to each row with one query.
    async fn hydrate(&self, rows: Vec<OrganizationRow>) -> Result<Vec<Organization>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let member_rows = sqlx::query_as::<Postgres, MemberRow>(
            r#"
            SELECT organization_id, user_id, role, joined_at
            FROM organization_members
            WHERE organization_id = ANY($1)
            ORDER BY joined_at ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, "Failed to fetch organization members");
            AppError::Database(e)
        })?;

        let mut by_org: HashMap<Uuid, Vec<OrganizationMember>> = HashMap::new();
        for m in member_rows {
            by_org
                .entry(m.organization_id)
                .or_default()
                .push(OrganizationMember {
                    user_id: m.user_id,
                    role: m.role,
                    joined_at: m.joined_at,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let members = by_org.remove(&row.id).unwrap_or_default();
                row.into_organization(members)
            })
            .collect())
    }

    async fn hydrate_one(
        &self,
        row: Option<OrganizationRow>,
    ) -> Result<Option<Organization>, AppError> {
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait::async_trait]
impl OrganizationRepository for PostgresOrganizationRepository {
    #[tracing::instrument(skip(self, org), fields(
        db.system = "postgresql",
        db.table = "organizations",
        db.operation = "insert"
    ))]
    async fn create(&self, org: NewOrganization) -> Result<Organization, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let row = sqlx::query_as::<Postgres, OrganizationRow>(
            r#"
            INSERT INTO organizations (
                id, name, slug, description, owner_id, settings, subscription,
                is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&org.name)
        .bind(&org.slug)
        .bind(&org.description)
        .bind(org.owner_id)
        .bind(Json(OrganizationSettings::default()))
        .bind(Json(Subscription::starting_at(now)))
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, slug = %org.slug, "Failed to insert organization");
            map_write_error(e, DUPLICATE_NAME)
        })?;

        sqlx::query(
            "INSERT INTO organization_members (organization_id, user_id, role, joined_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(row.id)
        .bind(org.owner_id)
        .bind(MemberRole::Owner)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, organization_id = %row.id, "Failed to insert owner membership");
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(AppError::Database)?;

        let owner = OrganizationMember {
            user_id: org.owner_id,
            role: MemberRole::Owner,
            joined_at: now,
        };
        Ok(row.into_organization(vec![owner]))
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "organizations",
        db.operation = "select",
        db.record_id = %id
    ))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Organization>, AppError> {
        let row = sqlx::query_as::<Postgres, OrganizationRow>(
            "SELECT * FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, organization_id = %id, "Failed to fetch organization");
            AppError::Database(e)
        })?;
        self.hydrate_one(row).await
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "organizations",
        db.operation = "select"
    ))]
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Organization>, AppError> {
        let row = sqlx::query_as::<Postgres, OrganizationRow>(
            "SELECT * FROM organizations WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, slug = %slug, "Failed to fetch organization by slug");
            AppError::Database(e)
        })?;
        self.hydrate_one(row).await
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "organizations",
        db.operation = "select",
        user_id = %user_id
    ))]
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Organization>, AppError> {
        let rows = sqlx::query_as::<Postgres, OrganizationRow>(
            r#"
            SELECT o.* FROM organizations o
            WHERE o.owner_id = $1
               OR EXISTS (
                   SELECT 1 FROM organization_members m
                   WHERE m.organization_id = o.id AND m.user_id = $1
               )
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, user_id = %user_id, "Failed to list organizations");
            AppError::Database(e)
        })?;
        self.hydrate(rows).await
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "organization_members",
        db.operation = "insert",
        db.record_id = %org_id
    ))]
    async fn add_member(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<Option<Organization>, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM organizations WHERE id = $1)")
                .bind(org_id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;
        if !exists {
            return Ok(None);
        }

        sqlx::query(
            "INSERT INTO organization_members (organization_id, user_id, role, joined_at) VALUES ($1, $2, $3, NOW())",
        )
        .bind(org_id)
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, organization_id = %org_id, user_id = %user_id, "Failed to add member");
            map_write_error(e, "User is already a member")
        })?;

        self.find_by_id(org_id).await
    }

    #[tracing::instrument(skip(self), fields(
        db.system = "postgresql",
        db.table = "organization_members",
        db.operation = "delete",
        db.record_id = %org_id
    ))]
    async fn remove_member(&self, org_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "DELETE FROM organization_members WHERE organization_id = $1 AND user_id = $2",
        )
        .bind(org_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = ?e, organization_id = %org_id, user_id = %user_id, "Failed to remove member");
            AppError::Database(e)
        })?;
        Ok(result.rows_affected() > 0)
    }
}
