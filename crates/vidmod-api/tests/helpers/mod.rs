//! Test helpers for vidmod-api integration tests.
//!
//! Every app runs on in-memory repositories and a temporary upload directory, so the
//! suite needs no external services.

#![allow(dead_code)]

pub mod auth;

use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use vidmod_api::setup::{build_state, database::in_memory_state, routes::setup_routes};
use vidmod_api::AppState;
use vidmod_core::{AppConfig, Config};
use vidmod_storage::{LocalStorage, Storage};

/// Build an API path (e.g. "videos" -> "/api/videos").
pub fn api_path(path: &str) -> String {
    format!("/api/{}", path.trim_start_matches('/'))
}

/// Running test app. Keep it alive for the duration of the test so the upload
/// directory is not removed underneath the workers.
pub struct TestApp {
    pub server: TestServer,
    pub state: Arc<AppState>,
    _upload_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Poll the video until its processing status is terminal.
    pub async fn wait_for_processing(&self, token: &str, video_id: &str) -> serde_json::Value {
        for _ in 0..100 {
            let response = self
                .server
                .get(&api_path(&format!("videos/{}", video_id)))
                .authorization_bearer(token)
                .await;
            let body: serde_json::Value = response.json();
            let video = body["data"]["video"].clone();
            match video["status"].as_str() {
                Some("completed") | Some("failed") => return video,
                _ => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }
        panic!("video {} never finished processing", video_id);
    }
}

pub fn test_config(upload_dir: &TempDir) -> Config {
    Config::new(AppConfig {
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        upload_path: upload_dir.path().to_path_buf(),
        public_base_url: "http://localhost:3000".to_string(),
        max_file_size_bytes: 1024 * 1024,
        ..Default::default()
    })
}

pub async fn setup_test_app() -> TestApp {
    let upload_dir = TempDir::new().expect("Failed to create upload dir");
    let config = test_config(&upload_dir);

    let storage: Arc<dyn Storage> = Arc::new(
        LocalStorage::new(
            upload_dir.path(),
            "http://localhost:3000/uploads".to_string(),
        )
        .await
        .expect("Failed to create storage"),
    );

    let state = build_state(config.clone(), in_memory_state(), storage)
        .await
        .expect("Failed to build state");
    let router = setup_routes(&config, state.clone()).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        state,
        _upload_dir: upload_dir,
    }
}
