// Storage error types
// Decision: Uniqueness violations surface as DuplicateKey regardless of backend,
// so the unique constraint (not a handler pre-check) is the source of truth

use thiserror::Error;

/// Result type alias for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint was violated (the payload names the constraint)
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    /// Database driver error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Any other storage failure
    #[error("Internal storage error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, StoreError::DuplicateKey(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err
                    .constraint()
                    .unwrap_or("unique constraint")
                    .to_string();
                return StoreError::DuplicateKey(constraint);
            }
        }
        StoreError::Database(err)
    }
}
