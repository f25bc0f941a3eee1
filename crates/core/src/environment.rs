// Environment domain types
//
// An environment is a named configuration namespace that owns variables.
// Used by both API and storage layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Environment - a named namespace grouping configuration variables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Environment {
    /// Unique identifier for the environment.
    pub id: i64,
    /// Unique slug identifying the environment (e.g., "production").
    #[cfg_attr(feature = "openapi", schema(example = "production"))]
    pub name: String,
    /// Short description of what the environment is for.
    pub description: Option<String>,
    /// Timestamp when the environment was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the environment was last updated.
    pub updated_at: DateTime<Utc>,
}
