//! vidmod storage library
//!
//! `Storage` abstracts where uploaded and processed files live. The only backend is the local
//! filesystem rooted at the uploads directory, which the API also serves under `/uploads`.
//!
//! # Storage key format
//!
//! - Source uploads: `videos/{uuid}.{ext}`
//! - Pipeline artifacts: `processed/{video_id}/{video_id}-stream.m3u8` and
//!   `processed/{video_id}/{video_id}-thumb.jpg`
//!
//! Keys must not contain `..` or a leading `/`. Key generation lives in the `keys` module.

pub mod factory;
pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use local::LocalStorage;
pub use traits::{Storage, StorageError, StorageResult};
