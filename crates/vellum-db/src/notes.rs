//! Note store implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use uuid::Uuid;

use vellum_core::{Error, Note, NoteDraft, NotePatch, NoteStore, Result, DEFAULT_COLOR};

/// PostgreSQL implementation of NoteStore.
pub struct PgNoteStore {
    pool: Pool<Postgres>,
}

impl PgNoteStore {
    /// Create a new PgNoteStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn map_note(row: PgRow) -> Note {
    Note {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        title: row.get("title"),
        description: row.get("description"),
        folder_id: row.get("folder_id"),
        color: row.get("color"),
        is_pinned: row.get("is_pinned"),
        is_locked: row.get("is_locked"),
        lock_pin_hash: row.get("lock_pin_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const NOTE_COLUMNS: &str = "id, owner_id, title, description, folder_id, color, \
                            is_pinned, is_locked, lock_pin_hash, created_at, updated_at";

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn create(&self, draft: NoteDraft) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO note (id, owner_id, title, description, folder_id, color,
                               is_pinned, is_locked, lock_pin_hash, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, NULL, $8, $8)",
        )
        .bind(id)
        .bind(draft.owner_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.folder_id)
        .bind(draft.color.unwrap_or(DEFAULT_COLOR))
        .bind(draft.is_pinned)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Note>> {
        let row = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM note WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(map_note))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM note WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_note).collect())
    }

    async fn list_by_folder(&self, folder_id: Uuid) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM note WHERE folder_id = $1 ORDER BY created_at DESC"
        ))
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(map_note).collect())
    }

    async fn update_fields(&self, id: Uuid, patch: NotePatch) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Row lock so a concurrent lock() cannot slip between the caller's
        // check and this write.
        let row = sqlx::query("SELECT is_locked FROM note WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let Some(row) = row else {
            return Ok(0);
        };
        if row.get::<bool, _>("is_locked") {
            return Err(Error::NoteLocked);
        }

        let mut sets: Vec<String> = Vec::new();
        let mut idx = 2; // $1 is the id
        if patch.title.is_some() {
            sets.push(format!("title = ${idx}"));
            idx += 1;
        }
        if patch.description.is_some() {
            sets.push(format!("description = ${idx}"));
            idx += 1;
        }
        if patch.folder_id.is_some() {
            sets.push(format!("folder_id = ${idx}"));
            idx += 1;
        }
        if patch.color.is_some() {
            sets.push(format!("color = ${idx}"));
            idx += 1;
        }
        if patch.is_pinned.is_some() {
            sets.push(format!("is_pinned = ${idx}"));
            idx += 1;
        }
        sets.push(format!("updated_at = ${idx}"));

        let sql = format!("UPDATE note SET {} WHERE id = $1", sets.join(", "));
        let mut query = sqlx::query(&sql).bind(id);
        if let Some(title) = &patch.title {
            query = query.bind(title);
        }
        if let Some(description) = &patch.description {
            query = query.bind(description);
        }
        if let Some(folder_id) = &patch.folder_id {
            query = query.bind(folder_id);
        }
        if let Some(color) = patch.color {
            query = query.bind(color);
        }
        if let Some(is_pinned) = patch.is_pinned {
            query = query.bind(is_pinned);
        }
        query = query.bind(Utc::now());

        let result = query.execute(&mut *tx).await.map_err(Error::Database)?;
        tx.commit().await.map_err(Error::Database)?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM note WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }

    async fn set_lock(&self, id: Uuid, pin_hash: &str) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query("SELECT is_locked FROM note WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))?;

        if row.get::<bool, _>("is_locked") {
            return Err(Error::AlreadyLocked);
        }

        sqlx::query(
            "UPDATE note SET is_locked = TRUE, lock_pin_hash = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(pin_hash)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn clear_lock(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            "UPDATE note SET is_locked = FALSE, lock_pin_hash = NULL, updated_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    async fn get_pin_hash(&self, id: Uuid) -> Result<Option<String>> {
        let row = sqlx::query("SELECT lock_pin_hash FROM note WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.and_then(|r| r.get("lock_pin_hash")))
    }
}
