// User service: credential store operations

use crate::storage::{
    models::{CreateUserRow, UpdateUserRow},
    password::{hash_password, verify_login},
    StorageBackend, StoreError, UserRow,
};
use confhub_core::User;
use std::sync::Arc;

use super::error::{ServiceError, ServiceResult};
use crate::api::users::{CreateUserRequest, UpdateUserRequest};

pub struct UserService {
    db: Arc<StorageBackend>,
}

impl UserService {
    pub fn new(db: Arc<StorageBackend>) -> Self {
        Self { db }
    }

    pub async fn create(&self, req: CreateUserRequest) -> ServiceResult<User> {
        // Fast path only; the unique constraint below is authoritative
        if self.db.get_user_by_username(&req.username).await?.is_some() {
            return Err(ServiceError::DuplicateUsername(req.username));
        }

        let input = CreateUserRow {
            password_hash: hash_password(&req.password)?,
            username: req.username.clone(),
            is_admin: req.is_admin,
        };
        let row = self
            .db
            .create_user(input)
            .await
            .map_err(|e| duplicate_or(e, || ServiceError::DuplicateUsername(req.username)))?;

        tracing::info!(user_id = row.id, username = %row.username, "User created");
        Ok(row.into())
    }

    pub async fn get(&self, id: i64) -> ServiceResult<User> {
        self.db
            .get_user(id)
            .await?
            .map(User::from)
            .ok_or(ServiceError::UserNotFound)
    }

    pub async fn get_by_username(&self, username: &str) -> ServiceResult<Option<UserRow>> {
        Ok(self.db.get_user_by_username(username).await?)
    }

    /// List one page of users (page is 1-based). Returns the page and the total count.
    pub async fn list(&self, page: u32, page_size: u32) -> ServiceResult<(Vec<User>, i64)> {
        let offset = (i64::from(page) - 1) * i64::from(page_size);
        let (rows, total) = self.db.list_users(offset, i64::from(page_size)).await?;
        Ok((rows.into_iter().map(User::from).collect(), total))
    }

    /// Replace username, password and admin flag; the password is always rehashed
    pub async fn update(&self, id: i64, req: UpdateUserRequest) -> ServiceResult<User> {
        let input = UpdateUserRow {
            password_hash: hash_password(&req.password)?,
            username: req.username.clone(),
            is_admin: req.is_admin,
        };
        let row = self
            .db
            .update_user(id, input)
            .await
            .map_err(|e| duplicate_or(e, || ServiceError::DuplicateUsername(req.username)))?
            .ok_or(ServiceError::UserNotFound)?;

        Ok(row.into())
    }

    /// Check credentials. Returns the user only when the username exists and the password matches.
    pub async fn authenticate(&self, username: &str, password: &str) -> ServiceResult<Option<UserRow>> {
        let user = self.db.get_user_by_username(username).await?;
        let valid = verify_login(password, user.as_ref().map(|u| u.password_hash.as_str()))?;
        Ok(user.filter(|_| valid))
    }
}

/// Map a unique-constraint violation to a domain error, anything else to Internal
pub(crate) fn duplicate_or(err: StoreError, duplicate: impl FnOnce() -> ServiceError) -> ServiceError {
    if err.is_duplicate_key() {
        duplicate()
    } else {
        err.into()
    }
}
