//! Core data models for vellum.
//!
//! These types are shared across all vellum crates and represent the core
//! domain entities: users, notes, collaborator grants, and folders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder shown in place of a locked note's description on every read
/// path that did not go through PIN verification.
pub const LOCKED_DESCRIPTION_PLACEHOLDER: &str = "[locked]";

/// Default display color for notes and folders (opaque ARGB).
pub const DEFAULT_COLOR: i64 = 4283192319;

// =============================================================================
// USER TYPES
// =============================================================================

/// A user as seen by the core (identity directory projection).
///
/// Credentials and profile assets live outside the core and are never
/// surfaced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A note row as persisted.
///
/// `lock_pin_hash` is a secret: it is skipped by serde so no response path
/// can surface it, regardless of lock state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    /// Immutable after creation; sole holder of destructive and lock rights.
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub folder_id: Option<Uuid>,
    pub color: i64,
    pub is_pinned: bool,
    pub is_locked: bool,
    /// Present iff `is_locked` is true.
    #[serde(skip)]
    pub lock_pin_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Whether the given user is this note's owner.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }
}

/// Draft for creating a new note. Notes always start unlocked.
#[derive(Debug, Clone)]
pub struct NoteDraft {
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub folder_id: Option<Uuid>,
    pub color: Option<i64>,
    pub is_pinned: bool,
}

/// Partial update for a note's mutable content fields.
///
/// Outer `None` means "leave unchanged"; for clearable fields the inner
/// `Option` distinguishes "set to NULL" from "set to a value".
#[derive(Debug, Clone, Default)]
pub struct NotePatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub folder_id: Option<Option<Uuid>>,
    pub color: Option<i64>,
    pub is_pinned: Option<bool>,
}

impl NotePatch {
    /// True when the patch carries no field changes at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.folder_id.is_none()
            && self.color.is_none()
            && self.is_pinned.is_none()
    }
}

/// Wire-safe projection of a note.
///
/// Construction decides redaction: [`NoteView::redacted`] is what listing
/// and plain fetch paths return, [`NoteView::unredacted`] is reserved for
/// the PIN-verified view flow (and for unlocked notes).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteView {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub folder_id: Option<Uuid>,
    pub color: i64,
    pub is_pinned: bool,
    pub is_locked: bool,
    pub is_collaboration: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoteView {
    /// Default read-path projection: the description of a locked note is
    /// replaced with a fixed placeholder.
    pub fn redacted(note: &Note, is_collaboration: bool) -> Self {
        let description = if note.is_locked {
            Some(LOCKED_DESCRIPTION_PLACEHOLDER.to_string())
        } else {
            note.description.clone()
        };
        Self::project(note, description, is_collaboration)
    }

    /// Full-content projection for the PIN-verified view/unlock flow.
    pub fn unredacted(note: &Note, is_collaboration: bool) -> Self {
        Self::project(note, note.description.clone(), is_collaboration)
    }

    fn project(note: &Note, description: Option<String>, is_collaboration: bool) -> Self {
        Self {
            id: note.id,
            owner_id: note.owner_id,
            title: note.title.clone(),
            description,
            folder_id: note.folder_id,
            color: note.color,
            is_pinned: note.is_pinned,
            is_locked: note.is_locked,
            is_collaboration,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

// =============================================================================
// COLLABORATOR TYPES
// =============================================================================

/// Collaborator role. Open enumeration: only `Editor` is live today, but
/// the wire representation tolerates future roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorRole {
    #[default]
    Editor,
}

impl CollaboratorRole {
    /// Stable string form used in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaboratorRole::Editor => "editor",
        }
    }
}

impl std::str::FromStr for CollaboratorRole {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "editor" => Ok(CollaboratorRole::Editor),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown collaborator role: {other}"
            ))),
        }
    }
}

/// A live collaborator grant on a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grant {
    pub note_id: Uuid,
    pub user_id: Uuid,
    pub added_by: Uuid,
    pub role: CollaboratorRole,
    pub created_at: DateTime<Utc>,
}

/// A grant joined with the grantee's display fields, for the per-note
/// collaborator listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorEntry {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub role: CollaboratorRole,
    pub added_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One entry of a user's "my collaborations" view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaborationSummary {
    pub note_id: Uuid,
    pub title: String,
    pub is_locked: bool,
    pub role: CollaboratorRole,
    pub owner_username: String,
}

// =============================================================================
// FOLDER TYPES
// =============================================================================

/// A folder with its denormalized note counter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub tag: Option<String>,
    pub color: i64,
    /// Count of non-deleted notes referencing this folder. Maintained by
    /// atomic increments, floored at zero, never recomputed by scan.
    pub notes_amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Draft for creating a folder.
#[derive(Debug, Clone)]
pub struct FolderDraft {
    pub owner_id: Uuid,
    pub name: String,
    pub tag: Option<String>,
    pub color: Option<i64>,
}

/// Partial update for a folder.
#[derive(Debug, Clone, Default)]
pub struct FolderPatch {
    pub name: Option<String>,
    pub tag: Option<Option<String>>,
    pub color: Option<i64>,
}
