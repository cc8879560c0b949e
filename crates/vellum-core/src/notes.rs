//! Note CRUD orchestration.
//!
//! Every operation runs through the access guard first; mutations
//! additionally respect the lock state, and folder counters are updated as
//! a side effect of successful create/move/delete.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{decide, Operation, Role};
use crate::error::{Error, Result};
use crate::models::{Note, NoteDraft, NotePatch, NoteView};
use crate::traits::{CollaboratorStore, FolderStore, NoteStore};

/// Service for note lifecycle operations.
pub struct NoteService {
    notes: Arc<dyn NoteStore>,
    collaborators: Arc<dyn CollaboratorStore>,
    folders: Arc<dyn FolderStore>,
}

impl NoteService {
    pub fn new(
        notes: Arc<dyn NoteStore>,
        collaborators: Arc<dyn CollaboratorStore>,
        folders: Arc<dyn FolderStore>,
    ) -> Self {
        Self {
            notes,
            collaborators,
            folders,
        }
    }

    async fn fetch_note(&self, note_id: Uuid) -> Result<Note> {
        self.notes
            .get(note_id)
            .await?
            .ok_or(Error::NoteNotFound(note_id))
    }

    async fn resolve_role(&self, actor_id: Uuid, note: &Note, op: Operation) -> Result<Role> {
        let has_grant = if note.is_owned_by(actor_id) {
            false
        } else {
            self.collaborators.has_grant(note.id, actor_id).await?
        };
        decide(actor_id, note, has_grant, op).into_result()
    }

    /// Create a note for the actor. Always starts unlocked; increments the
    /// target folder's counter when one is set.
    pub async fn create(&self, actor_id: Uuid, draft: NoteDraft) -> Result<Uuid> {
        if draft.title.trim().is_empty() {
            return Err(Error::InvalidInput("title is required".to_string()));
        }
        if draft.owner_id != actor_id {
            return Err(Error::NotAuthorized);
        }
        if let Some(folder_id) = draft.folder_id {
            if self.folders.get(folder_id).await?.is_none() {
                return Err(Error::FolderNotFound(folder_id));
            }
        }

        let folder_id = draft.folder_id;
        let note_id = self.notes.create(draft).await?;

        if let Some(folder_id) = folder_id {
            self.folders.increment_notes_amount(folder_id).await?;
        }

        info!(
            subsystem = "core",
            component = "notes",
            op = "create",
            note_id = %note_id,
            user_id = %actor_id,
            "Note created"
        );
        Ok(note_id)
    }

    /// Fetch a note through the default read path. Locked descriptions are
    /// redacted; PIN-gated disclosure goes through `LockService::view`.
    pub async fn get(&self, note_id: Uuid, actor_id: Uuid) -> Result<NoteView> {
        let note = self.fetch_note(note_id).await?;
        let role = self.resolve_role(actor_id, &note, Operation::Read).await?;
        Ok(NoteView::redacted(&note, role == Role::Collaborator))
    }

    /// List the actor's own notes plus their collaborations, each entry
    /// flagged and redacted per its lock state.
    pub async fn list_for_user(&self, actor_id: Uuid) -> Result<Vec<NoteView>> {
        let own = self.notes.list_by_owner(actor_id).await?;
        let mut views: Vec<NoteView> = own.iter().map(|n| NoteView::redacted(n, false)).collect();

        for summary in self.collaborators.list_by_user(actor_id).await? {
            match self.notes.get(summary.note_id).await? {
                Some(note) => views.push(NoteView::redacted(&note, true)),
                // A grant outliving its note means the deletion cascade was
                // interrupted; skip the entry rather than failing the list.
                None => warn!(
                    subsystem = "core",
                    component = "notes",
                    op = "list_for_user",
                    note_id = %summary.note_id,
                    "Dangling collaborator grant for missing note"
                ),
            }
        }
        Ok(views)
    }

    /// List the notes in a folder that the actor may read.
    pub async fn list_by_folder(&self, folder_id: Uuid, actor_id: Uuid) -> Result<Vec<NoteView>> {
        let mut views = Vec::new();
        for note in self.notes.list_by_folder(folder_id).await? {
            let has_grant = if note.is_owned_by(actor_id) {
                false
            } else {
                self.collaborators.has_grant(note.id, actor_id).await?
            };
            if let crate::access::Decision::Permit(role) =
                decide(actor_id, &note, has_grant, Operation::Read)
            {
                views.push(NoteView::redacted(&note, role == Role::Collaborator));
            }
        }
        Ok(views)
    }

    /// Update content fields. Denied with `NoteLocked` for every actor
    /// while locked. Folder moves adjust both folders' counters.
    pub async fn update(&self, note_id: Uuid, actor_id: Uuid, patch: NotePatch) -> Result<()> {
        if patch.is_empty() {
            return Err(Error::InvalidInput("no fields to update".to_string()));
        }

        let note = self.fetch_note(note_id).await?;
        self.resolve_role(actor_id, &note, Operation::Update).await?;

        let old_folder = note.folder_id;
        let new_folder = patch.folder_id;
        if let Some(Some(target)) = new_folder {
            if self.folders.get(target).await?.is_none() {
                return Err(Error::FolderNotFound(target));
            }
        }

        // The store re-checks the lock flag under a row lock.
        self.notes.update_fields(note_id, patch).await?;

        if let Some(new_folder) = new_folder {
            if new_folder != old_folder {
                if let Some(old) = old_folder {
                    self.folders.decrement_notes_amount(old).await?;
                }
                if let Some(new) = new_folder {
                    self.folders.increment_notes_amount(new).await?;
                }
            }
        }

        info!(
            subsystem = "core",
            component = "notes",
            op = "update",
            note_id = %note_id,
            user_id = %actor_id,
            "Note updated"
        );
        Ok(())
    }

    /// Delete a note. Owner only; not gated by lock state. Cascades grant
    /// removal and decrements the note's folder counter.
    pub async fn delete(&self, note_id: Uuid, actor_id: Uuid) -> Result<()> {
        let note = self.fetch_note(note_id).await?;
        self.resolve_role(actor_id, &note, Operation::Delete).await?;

        self.collaborators.remove_all(note_id).await?;
        self.notes.delete(note_id).await?;

        if let Some(folder_id) = note.folder_id {
            self.folders.decrement_notes_amount(folder_id).await?;
        }

        info!(
            subsystem = "core",
            component = "notes",
            op = "delete",
            note_id = %note_id,
            user_id = %actor_id,
            "Note deleted"
        );
        Ok(())
    }
}
