// User domain types
//
// Public projection of a user record. The password hash never leaves the
// storage layer, so it has no field here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// User - an account allowed to log in and obtain bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct User {
    /// Unique identifier for the user.
    pub id: i64,
    /// Unique login name.
    #[cfg_attr(feature = "openapi", schema(example = "alice"))]
    pub username: String,
    /// Whether the user has admin privileges.
    pub is_admin: bool,
    /// Timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the user was last updated.
    pub updated_at: DateTime<Utc>,
}
