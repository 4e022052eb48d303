//! OpenAPI documentation, served at `/api/openapi.json` and rendered under `/docs`.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::constants::API_VERSION;
use crate::error;
use crate::handlers;
use crate::setup::routes::health;
use vidmod_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// Returns the OpenAPI spec stamped with the crate version.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    let mut spec = ApiDoc::openapi();
    spec.info.version = API_VERSION.to_string();
    spec
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Video Processing API",
        description = "Video upload with asynchronous sensitivity moderation, HLS streaming, role-based access control and organizations."
    ),
    paths(
        handlers::root::root,
        health::health_check,
        // Auth
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::refresh_token,
        handlers::auth::profile,
        // Videos
        handlers::videos::upload_video,
        handlers::videos::list_videos,
        handlers::videos::my_videos,
        handlers::videos::get_video,
        handlers::videos::update_video,
        handlers::videos::delete_video,
        handlers::videos::stream_video,
        handlers::videos::moderate_video,
        handlers::videos::video_job,
        // Organizations
        handlers::organizations::create_organization,
        handlers::organizations::list_organizations,
        handlers::organizations::get_organization,
        handlers::organizations::add_member,
        handlers::organizations::remove_member,
    ),
    components(
        schemas(
            models::Video,
            models::VideoStatus,
            models::ModerationStatus,
            models::Organization,
            models::MemberRole,
            models::ProcessingJob,
            models::Pagination,
            models::UserResponse,
            models::RoleName,
            models::Permission,
            handlers::auth::RegisterRequest,
            handlers::auth::LoginRequest,
            handlers::auth::RefreshTokenRequest,
            handlers::auth::AuthPayload,
            handlers::auth::AccessTokenPayload,
            handlers::auth::ProfilePayload,
            handlers::videos::VideoPayload,
            handlers::videos::VideoListPayload,
            handlers::videos::StreamPayload,
            handlers::videos::JobPayload,
            handlers::videos::UpdateVideoRequest,
            handlers::videos::ModerateVideoRequest,
            handlers::organizations::CreateOrganizationRequest,
            handlers::organizations::AddMemberRequest,
            handlers::organizations::OrganizationPayload,
            handlers::organizations::OrganizationListPayload,
            error::ErrorBody,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "service", description = "Service information and health"),
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "videos", description = "Video upload, moderation and streaming"),
        (name = "organizations", description = "Organizations and membership")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_routes() {
        let spec = get_openapi_spec();
        assert_eq!(spec.info.version, API_VERSION);
        for path in [
            "/api/auth/register",
            "/api/videos",
            "/api/videos/{id}/stream",
            "/api/organizations/{id}/members/{user_id}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(spec
            .components
            .unwrap()
            .security_schemes
            .contains_key("bearer_auth"));
    }
}
