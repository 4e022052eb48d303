//! vidmod infrastructure library
//!
//! Shared pieces with no domain knowledge:
//! - Telemetry initialization (tracing subscriber)
//! - HTTP middleware (request ID, security headers)

pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use middleware::{
    request_id_middleware, security_headers_middleware, RequestId,
};
pub use telemetry::init_telemetry;
