//! Folder store implementation.
//!
//! The `notes_amount` counter is maintained by single-statement atomic
//! updates; the decrement carries a zero floor in its WHERE clause.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use vellum_core::{Error, Folder, FolderDraft, FolderPatch, FolderStore, Result, DEFAULT_COLOR};

/// PostgreSQL implementation of FolderStore.
pub struct PgFolderStore {
    pool: Pool<Postgres>,
}

impl PgFolderStore {
    /// Create a new PgFolderStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_folder(row: PgRow) -> Folder {
    Folder {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        tag: row.get("tag"),
        color: row.get("color"),
        notes_amount: row.get("notes_amount"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl FolderStore for PgFolderStore {
    async fn create(&self, draft: FolderDraft) -> Result<Uuid> {
        let id = Uuid::now_v7();

        sqlx::query(
            "INSERT INTO folder (id, owner_id, name, tag, color, notes_amount, created_at)
             VALUES ($1, $2, $3, $4, $5, 0, $6)",
        )
        .bind(id)
        .bind(draft.owner_id)
        .bind(&draft.name)
        .bind(&draft.tag)
        .bind(draft.color.unwrap_or(DEFAULT_COLOR))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Folder>> {
        let row = sqlx::query(
            "SELECT id, owner_id, name, tag, color, notes_amount, created_at
             FROM folder WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(map_folder))
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<Folder>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, name, tag, color, notes_amount, created_at
             FROM folder WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_folder).collect())
    }

    async fn update(&self, id: Uuid, patch: FolderPatch) -> Result<u64> {
        let mut sets: Vec<String> = Vec::new();
        let mut idx = 2; // $1 is the id
        if patch.name.is_some() {
            sets.push(format!("name = ${idx}"));
            idx += 1;
        }
        if patch.tag.is_some() {
            sets.push(format!("tag = ${idx}"));
            idx += 1;
        }
        if patch.color.is_some() {
            sets.push(format!("color = ${idx}"));
        }
        if sets.is_empty() {
            return Ok(0);
        }

        let sql = format!("UPDATE folder SET {} WHERE id = $1", sets.join(", "));
        let mut query = sqlx::query(&sql).bind(id);
        if let Some(name) = &patch.name {
            query = query.bind(name);
        }
        if let Some(tag) = &patch.tag {
            query = query.bind(tag);
        }
        if let Some(color) = patch.color {
            query = query.bind(color);
        }

        let result = query.execute(&self.pool).await.map_err(Error::Database)?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Notes survive their folder; they just lose the reference.
        sqlx::query("UPDATE note SET folder_id = NULL WHERE folder_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM folder WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(result.rows_affected())
    }

    async fn increment_notes_amount(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE folder SET notes_amount = notes_amount + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(())
    }

    async fn decrement_notes_amount(&self, id: Uuid) -> Result<()> {
        // The notes_amount > 0 guard makes a decrement at zero a no-op.
        sqlx::query(
            "UPDATE folder SET notes_amount = notes_amount - 1
             WHERE id = $1 AND notes_amount > 0",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }
}
