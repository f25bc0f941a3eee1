// Variable domain types
//
// A variable is a key/value entry owned by exactly one environment.
// Names are unique within their environment only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Variable - a configuration entry scoped to one environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Variable {
    /// Unique identifier for the variable.
    pub id: i64,
    /// Variable name, unique within its environment.
    #[cfg_attr(feature = "openapi", schema(example = "DATABASE_PORT"))]
    pub name: String,
    /// Variable value.
    #[cfg_attr(feature = "openapi", schema(example = "5432"))]
    pub value: String,
    /// Short explanation of what the variable is for.
    pub description: Option<String>,
    /// Marks the value as sensitive. Advisory only: values are never masked.
    pub is_sensitive: bool,
    /// ID of the owning environment.
    pub environment_id: i64,
    /// Timestamp when the variable was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the variable was last updated.
    pub updated_at: DateTime<Utc>,
}
