//! Collaborator grant store implementation.
//!
//! The per-note cap and the `(note_id, user_id)` uniqueness are enforced
//! here: the cap check runs inside the insert transaction under a row lock
//! on the note, and the unique constraint backs the duplicate check.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use vellum_core::{
    CollaborationSummary, CollaboratorEntry, CollaboratorRole, CollaboratorStore, Error, Grant,
    Result, MAX_COLLABORATORS,
};

/// PostgreSQL implementation of CollaboratorStore.
pub struct PgCollaboratorStore {
    pool: Pool<Postgres>,
}

impl PgCollaboratorStore {
    /// Create a new PgCollaboratorStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn parse_role(raw: &str) -> Result<CollaboratorRole> {
    CollaboratorRole::from_str(raw)
        .map_err(|_| Error::Internal(format!("unrecognized role in database: {raw}")))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}

#[async_trait]
impl CollaboratorStore for PgCollaboratorStore {
    async fn insert(
        &self,
        note_id: Uuid,
        user_id: Uuid,
        added_by: Uuid,
        role: CollaboratorRole,
    ) -> Result<Grant> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Row lock on the note serializes concurrent grants, so two inserts
        // racing at count = cap - 1 cannot both pass the check.
        sqlx::query("SELECT id FROM note WHERE id = $1 FOR UPDATE")
            .bind(note_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(note_id))?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM note_collaborator WHERE note_id = $1")
                .bind(note_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;

        if count >= MAX_COLLABORATORS as i64 {
            return Err(Error::CollaboratorLimitExceeded(MAX_COLLABORATORS));
        }

        let created_at = Utc::now();
        let inserted = sqlx::query(
            "INSERT INTO note_collaborator (note_id, user_id, added_by, role, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(note_id)
        .bind(user_id)
        .bind(added_by)
        .bind(role.as_str())
        .bind(created_at)
        .execute(&mut *tx)
        .await;

        if let Err(err) = inserted {
            if is_unique_violation(&err) {
                return Err(Error::AlreadyCollaborator);
            }
            return Err(Error::Database(err));
        }

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "collaborators",
            op = "insert",
            note_id = %note_id,
            user_id = %user_id,
            "Collaborator grant recorded"
        );

        Ok(Grant {
            note_id,
            user_id,
            added_by,
            role,
            created_at,
        })
    }

    async fn remove(&self, note_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM note_collaborator WHERE note_id = $1 AND user_id = $2")
                .bind(note_id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_all(&self, note_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM note_collaborator WHERE note_id = $1")
            .bind(note_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }

    async fn list_by_note(&self, note_id: Uuid) -> Result<Vec<CollaboratorEntry>> {
        let rows = sqlx::query(
            "SELECT nc.user_id, u.username, u.email, nc.role, nc.added_by, nc.created_at
             FROM note_collaborator nc
             JOIN app_user u ON u.id = nc.user_id
             WHERE nc.note_id = $1
             ORDER BY nc.created_at ASC",
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|row: PgRow| {
                Ok(CollaboratorEntry {
                    user_id: row.get("user_id"),
                    username: row.get("username"),
                    email: row.get("email"),
                    role: parse_role(row.get("role"))?,
                    added_by: row.get("added_by"),
                    created_at: row.get("created_at"),
                })
            })
            .collect()
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<CollaborationSummary>> {
        let rows = sqlx::query(
            "SELECT n.id AS note_id, n.title, n.is_locked, nc.role, u.username AS owner_username
             FROM note_collaborator nc
             JOIN note n ON n.id = nc.note_id
             JOIN app_user u ON u.id = n.owner_id
             WHERE nc.user_id = $1
             ORDER BY nc.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter()
            .map(|row: PgRow| {
                Ok(CollaborationSummary {
                    note_id: row.get("note_id"),
                    title: row.get("title"),
                    is_locked: row.get("is_locked"),
                    role: parse_role(row.get("role"))?,
                    owner_username: row.get("owner_username"),
                })
            })
            .collect()
    }

    async fn has_grant(&self, note_id: Uuid, user_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM note_collaborator WHERE note_id = $1 AND user_id = $2
             )",
        )
        .bind(note_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(exists)
    }

    async fn count_live(&self, note_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM note_collaborator WHERE note_id = $1")
                .bind(note_id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;

        Ok(count)
    }
}
