//! Database repositories for the data access layer
//!
//! Each entity gets a repository trait plus a `Postgres*` implementation. The `memory`
//! module holds `InMemory*` implementations with the same semantics.

pub mod jobs;
pub mod memory;
pub mod organizations;
pub mod users;
pub mod videos;

pub use jobs::{JobRepository, PostgresJobRepository};
pub use memory::{
    InMemoryJobRepository, InMemoryOrganizationRepository, InMemoryUserRepository,
    InMemoryVideoRepository,
};
pub use organizations::{OrganizationRepository, PostgresOrganizationRepository};
pub use users::{PostgresUserRepository, UserRepository};
pub use videos::{PostgresVideoRepository, VideoRepository};

use vidmod_core::AppError;

const UNIQUE_VIOLATION: &str = "23505";

/// Map a sqlx error, turning unique-constraint violations into a conflict with `conflict_message`.
pub(crate) fn map_write_error(err: sqlx::Error, conflict_message: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return AppError::Conflict(conflict_message.to_string());
        }
    }
    AppError::Database(err)
}
