// Storage backend abstraction
// Decision: Use enum dispatch for simplicity over trait objects
//
// This module provides a unified StorageBackend enum that can work with
// either PostgreSQL (production) or in-memory (dev mode) storage.

use anyhow::Result;

use super::error::StoreResult;
use super::memory::InMemoryDatabase;
use super::models::*;
use super::repositories::Database;

/// Connection string that selects the in-memory backend
pub const IN_MEMORY_URL: &str = "memory://";

/// Storage backend that can be either PostgreSQL or in-memory
#[derive(Clone)]
pub enum StorageBackend {
    /// PostgreSQL database (production)
    Postgres(Database),
    /// In-memory database (dev mode)
    InMemory(std::sync::Arc<InMemoryDatabase>),
}

impl StorageBackend {
    /// Create a backend from a connection string.
    /// `memory://` selects the in-memory backend; anything else is PostgreSQL,
    /// whose schema is created if missing.
    pub async fn from_url(database_url: &str) -> Result<Self> {
        if database_url == IN_MEMORY_URL {
            return Ok(Self::in_memory());
        }
        let backend = Self::postgres(database_url).await?;
        if let Self::Postgres(db) = &backend {
            db.init_schema().await?;
        }
        Ok(backend)
    }

    /// Create a PostgreSQL storage backend from a database URL
    pub async fn postgres(database_url: &str) -> Result<Self> {
        let db = Database::from_url(database_url).await?;
        Ok(Self::Postgres(db))
    }

    /// Create an in-memory storage backend
    pub fn in_memory() -> Self {
        Self::InMemory(std::sync::Arc::new(InMemoryDatabase::new()))
    }

    /// Check if this is dev mode (in-memory)
    pub fn is_dev_mode(&self) -> bool {
        matches!(self, Self::InMemory(_))
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> StoreResult<UserRow> {
        match self {
            Self::Postgres(db) => db.create_user(input).await,
            Self::InMemory(db) => db.create_user(input).await,
        }
    }

    pub async fn get_user(&self, id: i64) -> StoreResult<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user(id).await,
            Self::InMemory(db) => db.get_user(id).await,
        }
    }

    pub async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.get_user_by_username(username).await,
            Self::InMemory(db) => db.get_user_by_username(username).await,
        }
    }

    pub async fn list_users(&self, offset: i64, limit: i64) -> StoreResult<(Vec<UserRow>, i64)> {
        match self {
            Self::Postgres(db) => db.list_users(offset, limit).await,
            Self::InMemory(db) => db.list_users(offset, limit).await,
        }
    }

    pub async fn update_user(&self, id: i64, input: UpdateUserRow) -> StoreResult<Option<UserRow>> {
        match self {
            Self::Postgres(db) => db.update_user(id, input).await,
            Self::InMemory(db) => db.update_user(id, input).await,
        }
    }

    // ============================================
    // Environments
    // ============================================

    pub async fn list_environments(
        &self,
        offset: i64,
        limit: i64,
    ) -> StoreResult<(Vec<EnvironmentRow>, i64)> {
        match self {
            Self::Postgres(db) => db.list_environments(offset, limit).await,
            Self::InMemory(db) => db.list_environments(offset, limit).await,
        }
    }

    pub async fn create_environment(
        &self,
        input: CreateEnvironmentRow,
    ) -> StoreResult<EnvironmentRow> {
        match self {
            Self::Postgres(db) => db.create_environment(input).await,
            Self::InMemory(db) => db.create_environment(input).await,
        }
    }

    pub async fn get_environment_by_name(&self, name: &str) -> StoreResult<Option<EnvironmentRow>> {
        match self {
            Self::Postgres(db) => db.get_environment_by_name(name).await,
            Self::InMemory(db) => db.get_environment_by_name(name).await,
        }
    }

    pub async fn update_environment(
        &self,
        name: &str,
        input: UpdateEnvironment,
    ) -> StoreResult<Option<EnvironmentRow>> {
        match self {
            Self::Postgres(db) => db.update_environment(name, input).await,
            Self::InMemory(db) => db.update_environment(name, input).await,
        }
    }

    pub async fn delete_environment(&self, name: &str) -> StoreResult<bool> {
        match self {
            Self::Postgres(db) => db.delete_environment(name).await,
            Self::InMemory(db) => db.delete_environment(name).await,
        }
    }

    // ============================================
    // Variables
    // ============================================

    pub async fn create_variable(&self, input: CreateVariableRow) -> StoreResult<VariableRow> {
        match self {
            Self::Postgres(db) => db.create_variable(input).await,
            Self::InMemory(db) => db.create_variable(input).await,
        }
    }

    pub async fn list_variables(&self, environment_id: i64) -> StoreResult<Vec<VariableRow>> {
        match self {
            Self::Postgres(db) => db.list_variables(environment_id).await,
            Self::InMemory(db) => db.list_variables(environment_id).await,
        }
    }

    pub async fn get_variable(
        &self,
        environment_id: i64,
        name: &str,
    ) -> StoreResult<Option<VariableRow>> {
        match self {
            Self::Postgres(db) => db.get_variable(environment_id, name).await,
            Self::InMemory(db) => db.get_variable(environment_id, name).await,
        }
    }

    pub async fn update_variable(
        &self,
        environment_id: i64,
        name: &str,
        input: UpdateVariable,
    ) -> StoreResult<Option<VariableRow>> {
        match self {
            Self::Postgres(db) => db.update_variable(environment_id, name, input).await,
            Self::InMemory(db) => db.update_variable(environment_id, name, input).await,
        }
    }

    pub async fn delete_variable(&self, environment_id: i64, name: &str) -> StoreResult<bool> {
        match self {
            Self::Postgres(db) => db.delete_variable(environment_id, name).await,
            Self::InMemory(db) => db.delete_variable(environment_id, name).await,
        }
    }
}
