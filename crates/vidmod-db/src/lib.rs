//! vidmod persistence layer
//!
//! Repository traits with a PostgreSQL implementation and an in-memory one used when no
//! database is configured and by the HTTP integration tests.

pub mod db;

pub use db::*;
