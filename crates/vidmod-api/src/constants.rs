//! API constants

/// Prefix for every JSON endpoint.
pub const API_PREFIX: &str = "/api";

/// Version reported by the root route.
pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Mount point for files served from the uploads root.
pub const UPLOADS_PATH: &str = "/uploads";

/// Slack on top of the file ceiling for multipart boundaries and text fields.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
