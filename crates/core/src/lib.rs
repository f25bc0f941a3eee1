// Confhub core
//
// DB-agnostic domain entity types used by the API and storage layers,
// plus the shared telemetry initialiser.

// Telemetry (structured logging)
pub mod telemetry;

// Domain entity types
pub mod environment;
pub mod user;
pub mod variable;

// Re-exports for convenience
pub use environment::Environment;
pub use user::User;
pub use variable::Variable;
