// Database models (internal, may differ from public DTOs)

use chrono::{DateTime, Utc};
use confhub_core::{Environment, User, Variable};
use sqlx::FromRow;

// ============================================
// Users
// ============================================

/// Full user record, including the password hash.
/// Never serialized; convert to `confhub_core::User` for output.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateUserRow {
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Full replacement of the mutable user fields
#[derive(Debug, Clone)]
pub struct UpdateUserRow {
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            is_admin: row.is_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ============================================
// Environments
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct EnvironmentRow {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateEnvironmentRow {
    pub name: String,
    pub description: Option<String>,
}

/// `description: None` leaves the column untouched, `Some(None)` clears it
#[derive(Debug, Clone, Default)]
pub struct UpdateEnvironment {
    pub description: Option<Option<String>>,
}

impl From<EnvironmentRow> for Environment {
    fn from(row: EnvironmentRow) -> Self {
        Environment {
            id: row.id,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ============================================
// Variables
// ============================================

#[derive(Debug, Clone, FromRow)]
pub struct VariableRow {
    pub id: i64,
    pub name: String,
    pub value: String,
    pub description: Option<String>,
    pub is_sensitive: bool,
    pub environment_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateVariableRow {
    pub environment_id: i64,
    pub name: String,
    pub value: String,
    pub description: Option<String>,
    pub is_sensitive: bool,
}

/// Field-level update; `None` keeps the stored value.
/// A full replace sets every field to `Some`.
#[derive(Debug, Clone, Default)]
pub struct UpdateVariable {
    pub value: Option<String>,
    pub description: Option<Option<String>>,
    pub is_sensitive: Option<bool>,
}

impl From<VariableRow> for Variable {
    fn from(row: VariableRow) -> Self {
        Variable {
            id: row.id,
            name: row.name,
            value: row.value,
            description: row.description,
            is_sensitive: row.is_sensitive,
            environment_id: row.environment_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
