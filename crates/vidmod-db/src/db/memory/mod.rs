//! In-memory repositories backed by `Arc<RwLock<..>>`.
//!
//! Used when no `DATABASE_URL` is configured and by the HTTP integration tests. Semantics match
//! the PostgreSQL implementations, including conditional status writes.

mod jobs;
mod organizations;
mod users;
mod videos;

pub use jobs::InMemoryJobRepository;
pub use organizations::InMemoryOrganizationRepository;
pub use users::InMemoryUserRepository;
pub use videos::InMemoryVideoRepository;
