//! Configuration module
//!
//! Server, database, authentication, upload and processing settings, read from the
//! environment (and an optional `.env` file) at startup.

use std::env;
use std::path::{Path, PathBuf};

// Common constants
const SERVER_PORT: u16 = 5000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const JWT_EXPIRY_HOURS: i64 = 24;
const JWT_REFRESH_EXPIRY_DAYS: i64 = 7;
const MAX_FILE_SIZE_BYTES: usize = 100 * 1024 * 1024;
const PROCESSING_MAX_CONCURRENT: usize = 4;
const PROCESSING_QUEUE_SIZE: usize = 1000;

const DEV_JWT_SECRET: &str = "vidmod-development-access-secret-change-me";
const DEV_JWT_REFRESH_SECRET: &str = "vidmod-development-refresh-secret-change-me";

/// Video container formats accepted for upload.
pub const VIDEO_FORMATS: &[&str] = &["mp4", "avi", "mov", "wmv", "flv", "mkv"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// `None` runs the service on in-memory repositories.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub jwt_expiry_hours: i64,
    pub jwt_refresh_expiry_days: i64,
    pub max_file_size_bytes: usize,
    pub video_allowed_formats: Vec<String>,
    pub upload_path: PathBuf,
    pub public_base_url: String,
    pub processing_max_concurrent: usize,
    pub processing_queue_size: usize,
    pub seed_admin_email: Option<String>,
    pub seed_admin_password: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            database_url: None,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_refresh_secret: DEV_JWT_REFRESH_SECRET.to_string(),
            jwt_expiry_hours: JWT_EXPIRY_HOURS,
            jwt_refresh_expiry_days: JWT_REFRESH_EXPIRY_DAYS,
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            video_allowed_formats: VIDEO_FORMATS.iter().map(|s| s.to_string()).collect(),
            upload_path: PathBuf::from("./uploads"),
            public_base_url: format!("http://localhost:{}", SERVER_PORT),
            processing_max_concurrent: PROCESSING_MAX_CONCURRENT,
            processing_queue_size: PROCESSING_QUEUE_SIZE,
            seed_admin_email: None,
            seed_admin_password: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let defaults = AppConfig::default();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| defaults.environment.clone());

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let cors_origins = env::var("CLIENT_URL")
            .map(|s| split_list(&s))
            .unwrap_or(defaults.cors_origins);

        let video_allowed_formats = env::var("VIDEO_ALLOWED_FORMATS")
            .map(|s| {
                split_list(&s)
                    .into_iter()
                    .map(|f| f.to_lowercase())
                    .collect()
            })
            .unwrap_or(defaults.video_allowed_formats);

        Ok(Self {
            server_port,
            cors_origins,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.trim().is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_refresh_secret: env::var("JWT_REFRESH_SECRET")
                .unwrap_or(defaults.jwt_refresh_secret),
            jwt_expiry_hours: env::var("JWT_EXPIRE_HOURS")
                .unwrap_or_else(|_| JWT_EXPIRY_HOURS.to_string())
                .parse()
                .unwrap_or(JWT_EXPIRY_HOURS),
            jwt_refresh_expiry_days: env::var("JWT_REFRESH_EXPIRE_DAYS")
                .unwrap_or_else(|_| JWT_REFRESH_EXPIRY_DAYS.to_string())
                .parse()
                .unwrap_or(JWT_REFRESH_EXPIRY_DAYS),
            max_file_size_bytes: env::var("MAX_FILE_SIZE")
                .unwrap_or_else(|_| MAX_FILE_SIZE_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_FILE_SIZE_BYTES),
            video_allowed_formats,
            upload_path: env::var("UPLOAD_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_path),
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", server_port)),
            processing_max_concurrent: env::var("PROCESSING_MAX_CONCURRENT")
                .unwrap_or_else(|_| PROCESSING_MAX_CONCURRENT.to_string())
                .parse()
                .unwrap_or(PROCESSING_MAX_CONCURRENT),
            processing_queue_size: env::var("PROCESSING_QUEUE_SIZE")
                .unwrap_or_else(|_| PROCESSING_QUEUE_SIZE.to_string())
                .parse()
                .unwrap_or(PROCESSING_QUEUE_SIZE),
            seed_admin_email: env::var("SEED_ADMIN_EMAIL").ok(),
            seed_admin_password: env::var("SEED_ADMIN_PASSWORD").ok(),
            environment,
        })
    }

    fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() {
            if self.jwt_secret == DEV_JWT_SECRET || self.jwt_refresh_secret == DEV_JWT_REFRESH_SECRET
            {
                return Err(anyhow::anyhow!(
                    "JWT_SECRET and JWT_REFRESH_SECRET must be set in production"
                ));
            }
            if self.jwt_secret.len() < 32 || self.jwt_refresh_secret.len() < 32 {
                return Err(anyhow::anyhow!(
                    "JWT_SECRET and JWT_REFRESH_SECRET must be at least 32 characters long"
                ));
            }
            if self.cors_origins.iter().any(|o| o == "*") {
                return Err(anyhow::anyhow!(
                    "CLIENT_URL cannot be '*' in production. Please specify explicit origins."
                ));
            }
        }

        if self.jwt_secret.is_empty() || self.jwt_refresh_secret.is_empty() {
            return Err(anyhow::anyhow!("JWT secrets must not be empty"));
        }

        if self.jwt_secret == self.jwt_refresh_secret {
            return Err(anyhow::anyhow!(
                "JWT_SECRET and JWT_REFRESH_SECRET must differ"
            ));
        }

        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE must be greater than zero"));
        }

        if self.processing_max_concurrent == 0 || self.processing_queue_size == 0 {
            return Err(anyhow::anyhow!(
                "PROCESSING_MAX_CONCURRENT and PROCESSING_QUEUE_SIZE must be at least 1"
            ));
        }

        if self.seed_admin_email.is_some() != self.seed_admin_password.is_some() {
            return Err(anyhow::anyhow!(
                "SEED_ADMIN_EMAIL and SEED_ADMIN_PASSWORD must be set together"
            ));
        }

        Ok(())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

impl Config {
    fn inner(&self) -> &AppConfig {
        &self.0
    }

    pub fn new(config: AppConfig) -> Self {
        Config(Box::new(config))
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AppConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        self.inner().is_production()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().cors_origins
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().jwt_secret
    }

    pub fn jwt_refresh_secret(&self) -> &str {
        &self.inner().jwt_refresh_secret
    }

    pub fn jwt_expiry_hours(&self) -> i64 {
        self.inner().jwt_expiry_hours
    }

    pub fn jwt_refresh_expiry_days(&self) -> i64 {
        self.inner().jwt_refresh_expiry_days
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.inner().max_file_size_bytes
    }

    pub fn video_allowed_formats(&self) -> &[String] {
        &self.inner().video_allowed_formats
    }

    pub fn upload_path(&self) -> &Path {
        &self.inner().upload_path
    }

    pub fn public_base_url(&self) -> &str {
        &self.inner().public_base_url
    }

    pub fn processing_max_concurrent(&self) -> usize {
        self.inner().processing_max_concurrent
    }

    pub fn processing_queue_size(&self) -> usize {
        self.inner().processing_queue_size
    }

    /// Admin account to create on startup, if configured.
    pub fn seed_admin(&self) -> Option<(&str, &str)> {
        match (
            self.inner().seed_admin_email.as_deref(),
            self.inner().seed_admin_password.as_deref(),
        ) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::new(AppConfig::default());
        assert!(config.validate().is_ok());
        assert!(!config.is_production());
        assert_eq!(config.max_file_size_bytes(), 104_857_600);
        assert_eq!(config.server_port(), 5000);
        assert_eq!(config.video_allowed_formats().len(), 6);
    }

    #[test]
    fn test_production_rejects_default_secrets() {
        let config = AppConfig {
            environment: "production".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_production_rejects_short_secrets() {
        let config = AppConfig {
            environment: "prod".to_string(),
            jwt_secret: "short".to_string(),
            jwt_refresh_secret: "also-short".to_string(),
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("32 characters"));
    }

    #[test]
    fn test_identical_secrets_rejected() {
        let config = AppConfig {
            jwt_secret: "same-secret-value-for-both-tokens-000".to_string(),
            jwt_refresh_secret: "same-secret-value-for-both-tokens-000".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_url_scheme_checked() {
        let config = AppConfig {
            database_url: Some("mysql://localhost/vidmod".to_string()),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_seed_admin_requires_both_values() {
        let config = AppConfig {
            seed_admin_email: Some("admin@example.com".to_string()),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = Config::new(AppConfig {
            seed_admin_email: Some("admin@example.com".to_string()),
            seed_admin_password: Some("admin123".to_string()),
            ..AppConfig::default()
        });
        assert!(config.validate().is_ok());
        assert_eq!(config.seed_admin(), Some(("admin@example.com", "admin123")));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("http://a.test, http://b.test,,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
