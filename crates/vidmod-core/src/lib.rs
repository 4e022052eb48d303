//! vidmod core library
//!
//! Domain models, error types and configuration shared by every vidmod crate.

pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{AppConfig, Config};
pub use error::{AppError, ErrorMetadata, LogLevel};
