// Authentication module
//
// Bearer token issuing and verification, the AuthUser extractor and the
// login route.

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod routes;

pub use config::JwtConfig;
pub use jwt::{Claims, JwtService, TokenError};
pub use middleware::{AuthError, AuthState, AuthUser};
pub use routes::routes;
