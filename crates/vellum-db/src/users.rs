//! Identity directory implementation.
//!
//! Read-only lookups against the `app_user` table. Account management is
//! out of scope for this crate.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use vellum_core::{Error, IdentityDirectory, Result, User};

/// PostgreSQL implementation of IdentityDirectory.
pub struct PgIdentityDirectory {
    pool: Pool<Postgres>,
}

impl PgIdentityDirectory {
    /// Create a new PgIdentityDirectory with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_user(row: PgRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
    }
}

#[async_trait]
impl IdentityDirectory for PgIdentityDirectory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, email FROM app_user WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_user))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, username, email FROM app_user WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_user))
    }
}
