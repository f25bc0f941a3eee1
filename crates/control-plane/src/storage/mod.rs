// Storage layer for the Confhub control-plane
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)
//
// - Database: PostgreSQL repositories (sqlx)
// - InMemoryDatabase: same contract backed by locked maps
// - StorageBackend: enum dispatch over the two

pub mod backend;
pub mod error;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;

pub use backend::{StorageBackend, IN_MEMORY_URL};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::Database;
