// Environment service for business logic

use crate::storage::{
    models::{CreateEnvironmentRow, UpdateEnvironment},
    EnvironmentRow, StorageBackend,
};
use confhub_core::Environment;
use std::sync::Arc;

use super::error::{ServiceError, ServiceResult};
use super::user::duplicate_or;
use crate::api::environments::{CreateEnvironmentRequest, UpdateEnvironmentRequest};

pub struct EnvironmentService {
    db: Arc<StorageBackend>,
}

impl EnvironmentService {
    pub fn new(db: Arc<StorageBackend>) -> Self {
        Self { db }
    }

    /// List one page of environments ordered by id (page is 1-based)
    pub async fn list(&self, page: u32, page_size: u32) -> ServiceResult<(Vec<Environment>, i64)> {
        let offset = (i64::from(page) - 1) * i64::from(page_size);
        let (rows, total) = self
            .db
            .list_environments(offset, i64::from(page_size))
            .await?;
        Ok((rows.into_iter().map(Environment::from).collect(), total))
    }

    pub async fn create(&self, req: CreateEnvironmentRequest) -> ServiceResult<Environment> {
        if self.db.get_environment_by_name(&req.name).await?.is_some() {
            return Err(ServiceError::DuplicateEnvironment(req.name));
        }

        let name = req.name.clone();
        let row = self
            .db
            .create_environment(CreateEnvironmentRow {
                name: req.name,
                description: req.description,
            })
            .await
            .map_err(|e| duplicate_or(e, || ServiceError::DuplicateEnvironment(name)))?;

        tracing::info!(environment_id = row.id, name = %row.name, "Environment created");
        Ok(row.into())
    }

    pub async fn get(&self, name: &str) -> ServiceResult<Environment> {
        self.resolve(name).await.map(Environment::from)
    }

    /// Update the description (the only mutable field). PUT and PATCH share this.
    pub async fn update(
        &self,
        name: &str,
        req: UpdateEnvironmentRequest,
    ) -> ServiceResult<Environment> {
        let input = UpdateEnvironment {
            description: req.description,
        };
        self.db
            .update_environment(name, input)
            .await?
            .map(Environment::from)
            .ok_or(ServiceError::EnvironmentNotFound)
    }

    /// Delete an environment together with all of its variables
    pub async fn delete(&self, name: &str) -> ServiceResult<()> {
        if self.db.delete_environment(name).await? {
            tracing::info!(name = %name, "Environment deleted");
            Ok(())
        } else {
            Err(ServiceError::EnvironmentNotFound)
        }
    }

    /// Look up an environment row by name, or EnvironmentNotFound
    pub(crate) async fn resolve(&self, name: &str) -> ServiceResult<EnvironmentRow> {
        self.db
            .get_environment_by_name(name)
            .await?
            .ok_or(ServiceError::EnvironmentNotFound)
    }
}
