// In-memory storage implementation for dev mode and tests
// Decision: Use parking_lot for thread-safe access
// Decision: Ids come from per-table counters, rows live in BTreeMaps so
// iteration order matches ORDER BY id in PostgreSQL
//
// This implementation provides the same contract as the PostgreSQL repositories:
// uniqueness constraints are checked under the write lock and deleting an
// environment cascades to its variables.
//
// Lock order is always environments -> variables.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;

use super::error::{StoreError, StoreResult};
use super::models::*;

/// Rows of one table plus its id sequence
struct Table<T> {
    rows: BTreeMap<i64, T>,
    next_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: Clone> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn page(&self, offset: i64, limit: i64) -> (Vec<T>, i64) {
        let total = self.rows.len() as i64;
        let rows = self
            .rows
            .values()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();
        (rows, total)
    }
}

/// In-memory database for dev mode
/// All data is stored in memory and lost on restart
#[derive(Default)]
pub struct InMemoryDatabase {
    users: RwLock<Table<UserRow>>,
    environments: RwLock<Table<EnvironmentRow>>,
    variables: RwLock<Table<VariableRow>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> StoreResult<UserRow> {
        let mut users = self.users.write();
        if users.rows.values().any(|u| u.username == input.username) {
            return Err(StoreError::DuplicateKey("users_username_key".to_string()));
        }

        let now = Self::now();
        let id = users.allocate_id();
        let row = UserRow {
            id,
            username: input.username,
            password_hash: input.password_hash,
            is_admin: input.is_admin,
            created_at: now,
            updated_at: now,
        };
        users.rows.insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_user(&self, id: i64) -> StoreResult<Option<UserRow>> {
        Ok(self.users.read().rows.get(&id).cloned())
    }

    pub async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        Ok(self
            .users
            .read()
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    pub async fn list_users(&self, offset: i64, limit: i64) -> StoreResult<(Vec<UserRow>, i64)> {
        Ok(self.users.read().page(offset, limit))
    }

    pub async fn update_user(&self, id: i64, input: UpdateUserRow) -> StoreResult<Option<UserRow>> {
        let mut users = self.users.write();
        if !users.rows.contains_key(&id) {
            return Ok(None);
        }
        if users
            .rows
            .values()
            .any(|u| u.id != id && u.username == input.username)
        {
            return Err(StoreError::DuplicateKey("users_username_key".to_string()));
        }

        let Some(user) = users.rows.get_mut(&id) else {
            return Ok(None);
        };
        user.username = input.username;
        user.password_hash = input.password_hash;
        user.is_admin = input.is_admin;
        user.updated_at = Self::now();
        Ok(Some(user.clone()))
    }

    // ============================================
    // Environments
    // ============================================

    pub async fn list_environments(
        &self,
        offset: i64,
        limit: i64,
    ) -> StoreResult<(Vec<EnvironmentRow>, i64)> {
        Ok(self.environments.read().page(offset, limit))
    }

    pub async fn create_environment(
        &self,
        input: CreateEnvironmentRow,
    ) -> StoreResult<EnvironmentRow> {
        let mut environments = self.environments.write();
        if environments.rows.values().any(|e| e.name == input.name) {
            return Err(StoreError::DuplicateKey(
                "environments_name_key".to_string(),
            ));
        }

        let now = Self::now();
        let id = environments.allocate_id();
        let row = EnvironmentRow {
            id,
            name: input.name,
            description: input.description,
            created_at: now,
            updated_at: now,
        };
        environments.rows.insert(id, row.clone());
        Ok(row)
    }

    pub async fn get_environment_by_name(&self, name: &str) -> StoreResult<Option<EnvironmentRow>> {
        Ok(self
            .environments
            .read()
            .rows
            .values()
            .find(|e| e.name == name)
            .cloned())
    }

    pub async fn update_environment(
        &self,
        name: &str,
        input: UpdateEnvironment,
    ) -> StoreResult<Option<EnvironmentRow>> {
        let mut environments = self.environments.write();
        if let Some(env) = environments.rows.values_mut().find(|e| e.name == name) {
            if let Some(description) = input.description {
                env.description = description;
            }
            env.updated_at = Self::now();
            return Ok(Some(env.clone()));
        }
        Ok(None)
    }

    pub async fn delete_environment(&self, name: &str) -> StoreResult<bool> {
        let mut environments = self.environments.write();
        let Some(id) = environments
            .rows
            .values()
            .find(|e| e.name == name)
            .map(|e| e.id)
        else {
            return Ok(false);
        };

        // Cascade while still holding the environments lock
        let mut variables = self.variables.write();
        variables.rows.retain(|_, v| v.environment_id != id);
        environments.rows.remove(&id);
        Ok(true)
    }

    // ============================================
    // Variables
    // ============================================

    pub async fn create_variable(&self, input: CreateVariableRow) -> StoreResult<VariableRow> {
        let environments = self.environments.read();
        if !environments.rows.contains_key(&input.environment_id) {
            return Err(StoreError::Internal(anyhow::anyhow!(
                "environment {} does not exist",
                input.environment_id
            )));
        }

        let mut variables = self.variables.write();
        if variables
            .rows
            .values()
            .any(|v| v.environment_id == input.environment_id && v.name == input.name)
        {
            return Err(StoreError::DuplicateKey(
                "variables_environment_id_name_key".to_string(),
            ));
        }

        let now = Self::now();
        let id = variables.allocate_id();
        let row = VariableRow {
            id,
            name: input.name,
            value: input.value,
            description: input.description,
            is_sensitive: input.is_sensitive,
            environment_id: input.environment_id,
            created_at: now,
            updated_at: now,
        };
        variables.rows.insert(id, row.clone());
        Ok(row)
    }

    pub async fn list_variables(&self, environment_id: i64) -> StoreResult<Vec<VariableRow>> {
        Ok(self
            .variables
            .read()
            .rows
            .values()
            .filter(|v| v.environment_id == environment_id)
            .cloned()
            .collect())
    }

    pub async fn get_variable(
        &self,
        environment_id: i64,
        name: &str,
    ) -> StoreResult<Option<VariableRow>> {
        Ok(self
            .variables
            .read()
            .rows
            .values()
            .find(|v| v.environment_id == environment_id && v.name == name)
            .cloned())
    }

    pub async fn update_variable(
        &self,
        environment_id: i64,
        name: &str,
        input: UpdateVariable,
    ) -> StoreResult<Option<VariableRow>> {
        let mut variables = self.variables.write();
        if let Some(var) = variables
            .rows
            .values_mut()
            .find(|v| v.environment_id == environment_id && v.name == name)
        {
            if let Some(value) = input.value {
                var.value = value;
            }
            if let Some(description) = input.description {
                var.description = description;
            }
            if let Some(is_sensitive) = input.is_sensitive {
                var.is_sensitive = is_sensitive;
            }
            var.updated_at = Self::now();
            return Ok(Some(var.clone()));
        }
        Ok(None)
    }

    pub async fn delete_variable(&self, environment_id: i64, name: &str) -> StoreResult<bool> {
        let mut variables = self.variables.write();
        let id = variables
            .rows
            .values()
            .find(|v| v.environment_id == environment_id && v.name == name)
            .map(|v| v.id);

        match id {
            Some(id) => {
                variables.rows.remove(&id);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
