//! vidmod HTTP API
//!
//! Handlers, authentication, application state and router setup for the video
//! moderation service.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;
mod utils;

pub mod auth;
pub mod error;
pub mod state;

pub use error::{ApiResponse, HttpAppError};
pub use state::AppState;
