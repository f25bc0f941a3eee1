// Repository layer for PostgreSQL
// Decision: Runtime-checked queries (query_as) so the crate builds without a live database
// Decision: Multi-statement operations run in a transaction; dropping it rolls back
// and returns the connection to the pool on every exit path

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::error::StoreResult;
use super::models::*;

/// Idempotent schema, applied at startup
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username VARCHAR(100) NOT NULL,
        password_hash VARCHAR(255) NOT NULL,
        is_admin BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT users_username_key UNIQUE (username)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS environments (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT environments_name_key UNIQUE (name)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS variables (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        value TEXT NOT NULL,
        description TEXT,
        is_sensitive BOOLEAN NOT NULL DEFAULT FALSE,
        environment_id BIGINT NOT NULL REFERENCES environments(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT variables_environment_id_name_key UNIQUE (environment_id, name)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_variables_environment_id ON variables (environment_id)",
];

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create database connection from URL
    pub async fn from_url(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;
        Ok(Self { pool })
    }

    /// Create tables and indexes if they do not exist yet
    pub async fn init_schema(&self) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    // ============================================
    // Users
    // ============================================

    pub async fn create_user(&self, input: CreateUserRow) -> StoreResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash, is_admin, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING id, username, password_hash, is_admin, created_at, updated_at
            "#,
        )
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(input.is_admin)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user(&self, id: i64) -> StoreResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, is_admin, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, is_admin, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_users(&self, offset: i64, limit: i64) -> StoreResult<(Vec<UserRow>, i64)> {
        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;

        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, is_admin, created_at, updated_at
            FROM users
            ORDER BY id
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((rows, total))
    }

    pub async fn update_user(&self, id: i64, input: UpdateUserRow) -> StoreResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                username = $2,
                password_hash = $3,
                is_admin = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, password_hash, is_admin, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(input.is_admin)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    // ============================================
    // Environments
    // ============================================

    pub async fn list_environments(
        &self,
        offset: i64,
        limit: i64,
    ) -> StoreResult<(Vec<EnvironmentRow>, i64)> {
        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM environments")
            .fetch_one(&mut *tx)
            .await?;

        let rows = sqlx::query_as::<_, EnvironmentRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM environments
            ORDER BY id
            OFFSET $1
            LIMIT $2
            "#,
        )
        .bind(offset)
        .bind(limit)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((rows, total))
    }

    pub async fn create_environment(
        &self,
        input: CreateEnvironmentRow,
    ) -> StoreResult<EnvironmentRow> {
        // NOW() is fixed for the statement, so created_at == updated_at
        let row = sqlx::query_as::<_, EnvironmentRow>(
            r#"
            INSERT INTO environments (name, description, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn get_environment_by_name(&self, name: &str) -> StoreResult<Option<EnvironmentRow>> {
        let row = sqlx::query_as::<_, EnvironmentRow>(
            r#"
            SELECT id, name, description, created_at, updated_at
            FROM environments
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_environment(
        &self,
        name: &str,
        input: UpdateEnvironment,
    ) -> StoreResult<Option<EnvironmentRow>> {
        let row = sqlx::query_as::<_, EnvironmentRow>(
            r#"
            UPDATE environments
            SET
                description = CASE WHEN $2 THEN $3 ELSE description END,
                updated_at = NOW()
            WHERE name = $1
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(input.description.is_some())
        .bind(input.description.flatten())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Delete an environment; its variables go with it (ON DELETE CASCADE)
    pub async fn delete_environment(&self, name: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM environments WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================
    // Variables
    // ============================================

    pub async fn create_variable(&self, input: CreateVariableRow) -> StoreResult<VariableRow> {
        let row = sqlx::query_as::<_, VariableRow>(
            r#"
            INSERT INTO variables (name, value, description, is_sensitive, environment_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING id, name, value, description, is_sensitive, environment_id, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.value)
        .bind(&input.description)
        .bind(input.is_sensitive)
        .bind(input.environment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn list_variables(&self, environment_id: i64) -> StoreResult<Vec<VariableRow>> {
        let rows = sqlx::query_as::<_, VariableRow>(
            r#"
            SELECT id, name, value, description, is_sensitive, environment_id, created_at, updated_at
            FROM variables
            WHERE environment_id = $1
            ORDER BY id
            "#,
        )
        .bind(environment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn get_variable(
        &self,
        environment_id: i64,
        name: &str,
    ) -> StoreResult<Option<VariableRow>> {
        let row = sqlx::query_as::<_, VariableRow>(
            r#"
            SELECT id, name, value, description, is_sensitive, environment_id, created_at, updated_at
            FROM variables
            WHERE environment_id = $1 AND name = $2
            "#,
        )
        .bind(environment_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn update_variable(
        &self,
        environment_id: i64,
        name: &str,
        input: UpdateVariable,
    ) -> StoreResult<Option<VariableRow>> {
        let row = sqlx::query_as::<_, VariableRow>(
            r#"
            UPDATE variables
            SET
                value = COALESCE($3, value),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                is_sensitive = COALESCE($6, is_sensitive),
                updated_at = NOW()
            WHERE environment_id = $1 AND name = $2
            RETURNING id, name, value, description, is_sensitive, environment_id, created_at, updated_at
            "#,
        )
        .bind(environment_id)
        .bind(name)
        .bind(&input.value)
        .bind(input.description.is_some())
        .bind(input.description.flatten())
        .bind(input.is_sensitive)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn delete_variable(&self, environment_id: i64, name: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM variables WHERE environment_id = $1 AND name = $2")
            .bind(environment_id)
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
