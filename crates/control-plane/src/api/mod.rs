// HTTP API routes
//
// This module contains all HTTP route handlers for the public API.
// Each submodule handles a specific resource type with its own AppState.

pub mod common;
pub mod environments;
pub mod status;
pub mod users;
pub mod validation;
pub mod variables;

// Re-export common types
pub use common::{ErrorResponse, Paginated, Pagination};
