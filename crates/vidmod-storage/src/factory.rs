use crate::{LocalStorage, Storage, StorageResult};
use std::sync::Arc;
use vidmod_core::Config;

/// Create the storage backend rooted at the configured uploads directory.
///
/// Files are served by the API under `{PUBLIC_BASE_URL}/uploads`.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let base_url = format!("{}/uploads", config.public_base_url().trim_end_matches('/'));
    let storage = LocalStorage::new(config.upload_path(), base_url).await?;
    Ok(Arc::new(storage))
}
