//! Repository traits for vellum abstractions.
//!
//! These traits define the interfaces that concrete store implementations
//! must satisfy, enabling pluggable backends and testability. The core
//! treats every method as fallible; implementations are expected to provide
//! the transactional guarantees called out on individual methods.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// IDENTITY DIRECTORY
// =============================================================================

/// Read-only lookup of user identities.
///
/// External collaborator: registration, credentials, and profile management
/// live outside the core.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Resolve a user by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Resolve a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}

// =============================================================================
// NOTE STORE
// =============================================================================

/// Persistence for notes, including the lock-specific mutators.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Insert a new note. Notes are always created unlocked.
    async fn create(&self, draft: NoteDraft) -> Result<Uuid>;

    /// Fetch a note by id.
    async fn get(&self, id: Uuid) -> Result<Option<Note>>;

    /// List all notes owned by a user.
    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Note>>;

    /// List all notes referencing a folder.
    async fn list_by_folder(&self, folder_id: Uuid) -> Result<Vec<Note>>;

    /// Apply a partial update to content fields and advance `updated_at`.
    ///
    /// Implementations must re-check the lock flag under a row lock and
    /// fail with `Error::NoteLocked` if the note is locked, so that a
    /// concurrent `lock` cannot slip between the caller's check and the
    /// write. Returns the number of affected rows.
    async fn update_fields(&self, id: Uuid, patch: NotePatch) -> Result<u64>;

    /// Delete a note. Returns the number of affected rows.
    async fn delete(&self, id: Uuid) -> Result<u64>;

    /// Set the lock flag and PIN hash in one write.
    ///
    /// Implementations must fail with `Error::AlreadyLocked` if the note is
    /// already locked at write time.
    async fn set_lock(&self, id: Uuid, pin_hash: &str) -> Result<()>;

    /// Clear the lock flag and PIN hash in one write.
    async fn clear_lock(&self, id: Uuid) -> Result<()>;

    /// Fetch the stored PIN hash, if the note is locked.
    async fn get_pin_hash(&self, id: Uuid) -> Result<Option<String>>;
}

// =============================================================================
// COLLABORATOR STORE
// =============================================================================

/// Persistence for collaborator grants.
///
/// The structural invariants (per-note cap, `(note_id, user_id)` uniqueness)
/// are enforced here, atomically with the insert; role-based authorization
/// is the access guard's job.
#[async_trait]
pub trait CollaboratorStore: Send + Sync {
    /// Insert a grant.
    ///
    /// Implementations must take a row lock on the note and perform the cap
    /// check inside the same transaction as the insert, failing with
    /// `Error::CollaboratorLimitExceeded` at the cap and
    /// `Error::AlreadyCollaborator` on a duplicate `(note_id, user_id)`.
    async fn insert(
        &self,
        note_id: Uuid,
        user_id: Uuid,
        added_by: Uuid,
        role: CollaboratorRole,
    ) -> Result<Grant>;

    /// Remove a grant. Returns `false` (not an error) if none existed.
    async fn remove(&self, note_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// Remove all grants for a note (note-deletion cascade).
    async fn remove_all(&self, note_id: Uuid) -> Result<u64>;

    /// List grants on a note in insertion order, joined with user display
    /// fields.
    async fn list_by_note(&self, note_id: Uuid) -> Result<Vec<CollaboratorEntry>>;

    /// The "my collaborations" view for a user.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<CollaborationSummary>>;

    /// Whether a live grant exists for `(note_id, user_id)`.
    async fn has_grant(&self, note_id: Uuid, user_id: Uuid) -> Result<bool>;

    /// Number of live grants on a note.
    async fn count_live(&self, note_id: Uuid) -> Result<i64>;
}

// =============================================================================
// FOLDER STORE / LEDGER
// =============================================================================

/// Persistence for folders, including the advisory note counter.
#[async_trait]
pub trait FolderStore: Send + Sync {
    /// Create a folder.
    async fn create(&self, draft: FolderDraft) -> Result<Uuid>;

    /// Fetch a folder by id.
    async fn get(&self, id: Uuid) -> Result<Option<Folder>>;

    /// List a user's folders.
    async fn list(&self, owner_id: Uuid) -> Result<Vec<Folder>>;

    /// Apply a partial update. Returns the number of affected rows.
    async fn update(&self, id: Uuid, patch: FolderPatch) -> Result<u64>;

    /// Delete a folder, detaching its notes (their `folder_id` becomes
    /// NULL). Returns the number of affected rows.
    async fn delete(&self, id: Uuid) -> Result<u64>;

    /// Atomically increment the folder's note counter.
    async fn increment_notes_amount(&self, id: Uuid) -> Result<()>;

    /// Atomically decrement the folder's note counter, floored at zero.
    /// A decrement at zero is a silent no-op, not an error.
    async fn decrement_notes_amount(&self, id: Uuid) -> Result<()>;
}
