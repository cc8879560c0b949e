//! # vellum-db
//!
//! PostgreSQL database layer for vellum.
//!
//! This crate provides:
//! - Connection pool management
//! - Store implementations for notes, collaborator grants, folders, and
//!   the identity directory
//! - Test fixtures for integration tests
//!
//! ## Example
//!
//! ```rust,ignore
//! use vellum_db::Database;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/vellum").await?;
//!     let note = db.notes.get(note_id).await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use sqlx::PgPool;

pub mod collaborators;
pub mod folders;
pub mod notes;
pub mod pool;
pub mod users;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use vellum_core::*;

pub use collaborators::PgCollaboratorStore;
pub use folders::PgFolderStore;
pub use notes::PgNoteStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use users::PgIdentityDirectory;

/// Aggregate of all store implementations over one shared pool.
pub struct Database {
    pub pool: PgPool,
    pub users: Arc<PgIdentityDirectory>,
    pub notes: Arc<PgNoteStore>,
    pub collaborators: Arc<PgCollaboratorStore>,
    pub folders: Arc<PgFolderStore>,
}

impl Database {
    /// Connect with default pool configuration and wire up all stores.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = create_pool(database_url).await?;
        Ok(Self::from_pool(pool))
    }

    /// Connect with a custom pool configuration.
    pub async fn connect_with_config(database_url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(database_url, config).await?;
        Ok(Self::from_pool(pool))
    }

    /// Build the store aggregate around an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgIdentityDirectory::new(pool.clone())),
            notes: Arc::new(PgNoteStore::new(pool.clone())),
            collaborators: Arc::new(PgCollaboratorStore::new(pool.clone())),
            folders: Arc::new(PgFolderStore::new(pool.clone())),
            pool,
        }
    }

    /// Run pending migrations from the embedded `migrations/` directory.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Internal(format!("migration failed: {e}")))?;
        Ok(())
    }
}
