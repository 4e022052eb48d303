//! Application setup and initialization
//!
//! Everything `main` needs to go from a loaded [`Config`] to a served router.

pub mod database;
pub mod routes;
pub mod seed;
pub mod server;

use crate::auth::TokenIssuer;
use crate::state::{AppState, DbState};
use anyhow::{Context, Result};
use std::sync::Arc;
use vidmod_core::Config;
use vidmod_processing::{
    ModerationPipeline, PlaceholderTranscoder, RandomContentClassifier, UploadValidator,
};
use vidmod_storage::{create_storage, Storage};
use vidmod_worker::{ProcessingQueue, ProcessingQueueConfig};

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    vidmod_infra::init_telemetry(config.is_production())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let db = database::setup_database(&config).await?;

    let storage = create_storage(&config)
        .await
        .context("Failed to initialize storage")?;

    seed::seed_admin(&config, &db).await?;

    let state = build_state(config, db, storage).await?;
    let router = routes::setup_routes(&state.config, state.clone())?;

    Ok((state, router))
}

/// Wire the moderation pipeline and processing queue over the given repositories and storage.
pub async fn build_state(
    config: Config,
    db: DbState,
    storage: Arc<dyn Storage>,
) -> Result<Arc<AppState>> {
    let pipeline = ModerationPipeline::new(
        db.videos.clone(),
        storage.clone(),
        Arc::new(RandomContentClassifier),
        Arc::new(PlaceholderTranscoder::new(storage.clone())),
    );

    let queue = ProcessingQueue::start(
        db.jobs.clone(),
        db.videos.clone(),
        Arc::new(pipeline),
        ProcessingQueueConfig::from(&config),
    )
    .await
    .context("Failed to start processing queue")?;

    let validator = UploadValidator::new(
        config.max_file_size_bytes(),
        config.video_allowed_formats().to_vec(),
    );
    let tokens = TokenIssuer::from_config(&config);

    Ok(Arc::new(AppState {
        config,
        db,
        storage,
        tokens,
        validator,
        queue,
    }))
}
