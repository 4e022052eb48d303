//! Application state shared by every handler.

use crate::auth::TokenIssuer;
use sqlx::PgPool;
use std::sync::Arc;
use vidmod_core::Config;
use vidmod_db::{JobRepository, OrganizationRepository, UserRepository, VideoRepository};
use vidmod_processing::UploadValidator;
use vidmod_storage::Storage;
use vidmod_worker::ProcessingQueue;

/// Repositories plus the pool backing them. `pool` is `None` when running on the in-memory
/// repositories.
#[derive(Clone)]
pub struct DbState {
    pub pool: Option<PgPool>,
    pub users: Arc<dyn UserRepository>,
    pub videos: Arc<dyn VideoRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
    pub jobs: Arc<dyn JobRepository>,
}

pub struct AppState {
    pub config: Config,
    pub db: DbState,
    pub storage: Arc<dyn Storage>,
    pub tokens: TokenIssuer,
    pub validator: UploadValidator,
    pub queue: ProcessingQueue,
}
