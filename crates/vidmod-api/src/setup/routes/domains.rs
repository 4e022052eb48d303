//! Route groups per domain (auth, videos, organizations).

use crate::constants::API_PREFIX;
use crate::handlers;
use crate::state::AppState;
use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;

/// Auth routes that take no bearer token.
pub fn public_auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("{}/auth/register", API_PREFIX), post(handlers::auth::register))
        .route(&format!("{}/auth/login", API_PREFIX), post(handlers::auth::login))
        .route(
            &format!("{}/auth/refresh-token", API_PREFIX),
            post(handlers::auth::refresh_token),
        )
        .with_state(state)
}

pub fn auth_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(&format!("{}/auth/logout", API_PREFIX), post(handlers::auth::logout))
        .route(&format!("{}/auth/profile", API_PREFIX), get(handlers::auth::profile))
        .with_state(state)
}

pub fn video_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/videos", API_PREFIX),
            post(handlers::videos::upload_video).get(handlers::videos::list_videos),
        )
        .route(
            &format!("{}/videos/my-videos", API_PREFIX),
            get(handlers::videos::my_videos),
        )
        .route(
            &format!("{}/videos/{{id}}", API_PREFIX),
            get(handlers::videos::get_video)
                .put(handlers::videos::update_video)
                .delete(handlers::videos::delete_video),
        )
        .route(
            &format!("{}/videos/{{id}}/stream", API_PREFIX),
            get(handlers::videos::stream_video),
        )
        .route(
            &format!("{}/videos/{{id}}/moderate", API_PREFIX),
            put(handlers::videos::moderate_video),
        )
        .route(
            &format!("{}/videos/{{id}}/job", API_PREFIX),
            get(handlers::videos::video_job),
        )
        .with_state(state)
}

pub fn organization_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/organizations", API_PREFIX),
            post(handlers::organizations::create_organization)
                .get(handlers::organizations::list_organizations),
        )
        .route(
            &format!("{}/organizations/{{id}}", API_PREFIX),
            get(handlers::organizations::get_organization),
        )
        .route(
            &format!("{}/organizations/{{id}}/members", API_PREFIX),
            post(handlers::organizations::add_member),
        )
        .route(
            &format!("{}/organizations/{{id}}/members/{{user_id}}", API_PREFIX),
            delete(handlers::organizations::remove_member),
        )
        .with_state(state)
}
