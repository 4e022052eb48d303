pub mod auth;
pub mod organizations;
pub mod root;
pub mod videos;
