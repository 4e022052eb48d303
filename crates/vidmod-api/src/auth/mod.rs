pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;

pub use jwt::{Claims, TokenIssuer, TokenPair};
pub use middleware::auth_middleware;
pub use models::AuthContext;
