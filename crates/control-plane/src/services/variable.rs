// Variable service for business logic
// Decision: Every operation resolves the environment by name first; a variable
// is only ever addressed as (environment_id, name), never by its own id

use crate::storage::{
    models::{CreateVariableRow, UpdateVariable},
    StorageBackend,
};
use confhub_core::Variable;
use std::sync::Arc;

use super::environment::EnvironmentService;
use super::error::{ServiceError, ServiceResult};
use super::user::duplicate_or;
use crate::api::variables::{CreateVariableRequest, PatchVariableRequest, ReplaceVariableRequest};

pub struct VariableService {
    db: Arc<StorageBackend>,
    environments: EnvironmentService,
}

impl VariableService {
    pub fn new(db: Arc<StorageBackend>) -> Self {
        Self {
            environments: EnvironmentService::new(db.clone()),
            db,
        }
    }

    pub async fn create(
        &self,
        env_name: &str,
        req: CreateVariableRequest,
    ) -> ServiceResult<Variable> {
        let env = self.environments.resolve(env_name).await?;

        if self.db.get_variable(env.id, &req.name).await?.is_some() {
            return Err(ServiceError::DuplicateVariable(req.name));
        }

        let name = req.name.clone();
        let row = self
            .db
            .create_variable(CreateVariableRow {
                environment_id: env.id,
                name: req.name,
                value: req.value,
                description: req.description,
                is_sensitive: req.is_sensitive,
            })
            .await
            .map_err(|e| duplicate_or(e, || ServiceError::DuplicateVariable(name)))?;

        tracing::info!(
            environment = %env.name,
            variable = %row.name,
            "Variable created"
        );
        Ok(row.into())
    }

    /// All variables of an environment, ordered by id (unpaginated)
    pub async fn list(&self, env_name: &str) -> ServiceResult<Vec<Variable>> {
        let env = self.environments.resolve(env_name).await?;
        let rows = self.db.list_variables(env.id).await?;
        Ok(rows.into_iter().map(Variable::from).collect())
    }

    pub async fn get(&self, env_name: &str, var_name: &str) -> ServiceResult<Variable> {
        let env = self.environments.resolve(env_name).await?;
        self.db
            .get_variable(env.id, var_name)
            .await?
            .map(Variable::from)
            .ok_or(ServiceError::VariableNotFound)
    }

    /// Full replace: every mutable field is taken from the request,
    /// omitted optional fields reset to their defaults
    pub async fn replace(
        &self,
        env_name: &str,
        var_name: &str,
        req: ReplaceVariableRequest,
    ) -> ServiceResult<Variable> {
        let input = UpdateVariable {
            value: Some(req.value),
            description: Some(req.description),
            is_sensitive: Some(req.is_sensitive),
        };
        self.update(env_name, var_name, input).await
    }

    /// Partial update: only fields present in the request are applied
    pub async fn patch(
        &self,
        env_name: &str,
        var_name: &str,
        req: PatchVariableRequest,
    ) -> ServiceResult<Variable> {
        let input = UpdateVariable {
            value: req.value,
            description: req.description,
            is_sensitive: req.is_sensitive,
        };
        self.update(env_name, var_name, input).await
    }

    pub async fn delete(&self, env_name: &str, var_name: &str) -> ServiceResult<()> {
        let env = self.environments.resolve(env_name).await?;
        if self.db.delete_variable(env.id, var_name).await? {
            Ok(())
        } else {
            Err(ServiceError::VariableNotFound)
        }
    }

    async fn update(
        &self,
        env_name: &str,
        var_name: &str,
        input: UpdateVariable,
    ) -> ServiceResult<Variable> {
        let env = self.environments.resolve(env_name).await?;
        self.db
            .update_variable(env.id, var_name, input)
            .await?
            .map(Variable::from)
            .ok_or(ServiceError::VariableNotFound)
    }
}
