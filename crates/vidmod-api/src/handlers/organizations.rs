use crate::auth::AuthContext;
use crate::error::{ApiResponse, ErrorBody, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;
use vidmod_core::models::{slugify, MemberRole, NewOrganization, Organization};
use vidmod_core::AppError;

const ORGANIZATION_NOT_FOUND: &str = "Organization not found";

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrganizationRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Organization name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub role: MemberRole,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrganizationPayload {
    pub organization: Organization,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrganizationListPayload {
    pub organizations: Vec<Organization>,
}

async fn load_organization(state: &AppState, id: Uuid) -> Result<Organization, HttpAppError> {
    state
        .db
        .organizations
        .find_by_id(id)
        .await?
        .ok_or_else(|| HttpAppError(AppError::NotFound(ORGANIZATION_NOT_FOUND.to_string())))
}

#[utoipa::path(
    post,
    path = "/api/organizations",
    tag = "organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created successfully", body = OrganizationPayload),
        (status = 400, description = "Invalid name or name already taken", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, ctx, payload), fields(user_id = %ctx.user_id(), operation = "create_organization"))]
pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    ValidatedJson(payload): ValidatedJson<CreateOrganizationRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let name = payload.name.trim().to_string();
    let slug = slugify(&name);
    if name.is_empty() || slug.trim_matches('-').is_empty() {
        return Err(AppError::InvalidInput(
            "Organization name must contain letters or numbers".to_string(),
        )
        .into());
    }

    let organization = state
        .db
        .organizations
        .create(NewOrganization {
            name,
            slug,
            description: payload
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            owner_id: ctx.user_id(),
        })
        .await?;

    tracing::info!(organization_id = %organization.id, "Organization created");

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "Organization created successfully",
            OrganizationPayload { organization },
        ),
    ))
}

#[utoipa::path(
    get,
    path = "/api/organizations",
    tag = "organizations",
    responses(
        (status = 200, description = "Organizations the caller owns or belongs to", body = OrganizationListPayload)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_organizations(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
) -> Result<impl IntoResponse, HttpAppError> {
    let organizations = state.db.organizations.list_for_user(ctx.user_id()).await?;
    Ok(ApiResponse::data(OrganizationListPayload { organizations }))
}

#[utoipa::path(
    get,
    path = "/api/organizations/{id}",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    responses(
        (status = 200, description = "Organization found", body = OrganizationPayload),
        (status = 403, description = "Caller is not a member", body = ErrorBody),
        (status = 404, description = "Organization not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_organization(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organization = load_organization(&state, id).await?;
    if !organization.is_owner(ctx.user_id()) && !organization.is_member(ctx.user_id()) {
        return Err(AppError::forbidden("Not authorized to view this organization").into());
    }
    Ok(ApiResponse::data(OrganizationPayload { organization }))
}

#[utoipa::path(
    post,
    path = "/api/organizations/{id}/members",
    tag = "organizations",
    params(("id" = Uuid, Path, description = "Organization ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Member added successfully", body = OrganizationPayload),
        (status = 400, description = "User is already a member", body = ErrorBody),
        (status = 403, description = "Caller is not the owner", body = ErrorBody),
        (status = 404, description = "Organization or user not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, ctx, payload), fields(user_id = %ctx.user_id(), organization_id = %id, operation = "add_member"))]
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AddMemberRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organization = load_organization(&state, id).await?;
    if !organization.is_owner(ctx.user_id()) {
        return Err(AppError::forbidden("Only organization owner can add members").into());
    }
    if payload.role == MemberRole::Owner {
        return Err(AppError::InvalidInput(
            "An organization has exactly one owner".to_string(),
        )
        .into());
    }
    if organization.is_member(payload.user_id) {
        return Err(AppError::Conflict("User is already a member".to_string()).into());
    }
    state
        .db
        .users
        .find_by_id(payload.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let organization = state
        .db
        .organizations
        .add_member(id, payload.user_id, payload.role)
        .await?
        .ok_or_else(|| AppError::NotFound(ORGANIZATION_NOT_FOUND.to_string()))?;

    tracing::info!(member_id = %payload.user_id, role = %payload.role, "Member added");

    Ok(ApiResponse::with_message(
        "Member added successfully",
        OrganizationPayload { organization },
    ))
}

#[utoipa::path(
    delete,
    path = "/api/organizations/{id}/members/{user_id}",
    tag = "organizations",
    params(
        ("id" = Uuid, Path, description = "Organization ID"),
        ("user_id" = Uuid, Path, description = "Member user ID")
    ),
    responses(
        (status = 200, description = "Member removed successfully"),
        (status = 400, description = "The owner cannot be removed", body = ErrorBody),
        (status = 403, description = "Caller is not the owner", body = ErrorBody),
        (status = 404, description = "Organization or member not found", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, ctx), fields(user_id = %ctx.user_id(), operation = "remove_member"))]
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    ctx: AuthContext,
    Path((id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let organization = load_organization(&state, id).await?;
    if !organization.is_owner(ctx.user_id()) {
        return Err(AppError::forbidden("Only organization owner can remove members").into());
    }
    if organization.is_owner(member_id) {
        return Err(
            AppError::InvalidInput("The organization owner cannot be removed".to_string()).into(),
        );
    }

    if !state.db.organizations.remove_member(id, member_id).await? {
        return Err(AppError::NotFound("Member not found".to_string()).into());
    }

    tracing::info!(organization_id = %id, member_id = %member_id, "Member removed");
    Ok(ApiResponse::message("Member removed successfully"))
}
