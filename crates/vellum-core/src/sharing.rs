//! Collaboration registry: maps notes to their collaborator set.
//!
//! The registry enforces the structural invariants (per-note cap of two,
//! `(note_id, user_id)` uniqueness, no self-grant) and leaves role-based
//! authorization to the access guard, which it consults before mutating.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::access::{decide, Operation, Role};
use crate::error::{Error, Result};
use crate::models::{CollaborationSummary, CollaboratorEntry, CollaboratorRole, Grant, Note};
use crate::traits::{CollaboratorStore, IdentityDirectory, NoteStore};

/// Maximum live grants per note.
pub const MAX_COLLABORATORS: usize = 2;

/// Service managing collaborator grants on notes.
pub struct SharingService {
    notes: Arc<dyn NoteStore>,
    collaborators: Arc<dyn CollaboratorStore>,
    users: Arc<dyn IdentityDirectory>,
}

impl SharingService {
    pub fn new(
        notes: Arc<dyn NoteStore>,
        collaborators: Arc<dyn CollaboratorStore>,
        users: Arc<dyn IdentityDirectory>,
    ) -> Self {
        Self {
            notes,
            collaborators,
            users,
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

    /// Grant collaborator access to a user. Owner only; denied while the
    /// note is locked.
    pub async fn grant(
        &self,
        note_id: Uuid,
        grantee_id: Uuid,
        actor_id: Uuid,
        role: CollaboratorRole,
    ) -> Result<Grant> {
        let note = self.fetch_note(note_id).await?;
        self.resolve_role(actor_id, &note, Operation::ManageCollaborators)
            .await?;

        let grantee = self
            .users
            .find_by_id(grantee_id)
            .await?
            .ok_or_else(|| Error::UnknownUser(grantee_id.to_string()))?;

        if grantee.id == note.owner_id {
            return Err(Error::SelfGrantNotAllowed);
        }

        // The store re-checks the cap and uniqueness under a row lock.
        let grant = self
            .collaborators
            .insert(note_id, grantee.id, actor_id, role)
            .await?;

        info!(
            subsystem = "core",
            component = "sharing",
            op = "grant",
            note_id = %note_id,
            user_id = %grantee.id,
            "Collaborator added"
        );
        Ok(grant)
    }

    /// Grant collaborator access by grantee email, resolving it through the
    /// identity directory first.
    pub async fn grant_by_email(
        &self,
        note_id: Uuid,
        grantee_email: &str,
        actor_id: Uuid,
        role: CollaboratorRole,
    ) -> Result<Grant> {
        let grantee = self
            .users
            .find_by_email(grantee_email)
            .await?
            .ok_or_else(|| Error::UnknownUser(grantee_email.to_string()))?;
        self.grant(note_id, grantee.id, actor_id, role).await
    }

    /// Revoke a grant. Owner only; denied while the note is locked.
    /// Returns `false` (not an error) if no grant existed.
    pub async fn revoke(&self, note_id: Uuid, user_id: Uuid, actor_id: Uuid) -> Result<bool> {
        let note = self.fetch_note(note_id).await?;
        self.resolve_role(actor_id, &note, Operation::ManageCollaborators)
            .await?;

        let removed = self.collaborators.remove(note_id, user_id).await?;
        if removed {
            info!(
                subsystem = "core",
                component = "sharing",
                op = "revoke",
                note_id = %note_id,
                user_id = %user_id,
                "Collaborator removed"
            );
        }
        Ok(removed)
    }

    /// List a note's collaborators in insertion order. Owner and
    /// collaborators may list.
    pub async fn list_by_note(
        &self,
        note_id: Uuid,
        actor_id: Uuid,
    ) -> Result<Vec<CollaboratorEntry>> {
        let note = self.fetch_note(note_id).await?;
        self.resolve_role(actor_id, &note, Operation::Read).await?;

        self.collaborators.list_by_note(note_id).await
    }

    /// The "my collaborations" view for a user.
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<CollaborationSummary>> {
        self.collaborators.list_by_user(user_id).await
    }

    /// Whether `user_id` holds a live grant on `note_id`.
    pub async fn has_grant(&self, note_id: Uuid, user_id: Uuid) -> Result<bool> {
        self.collaborators.has_grant(note_id, user_id).await
    }

    /// Number of live grants on a note.
    pub async fn count_live(&self, note_id: Uuid) -> Result<i64> {
        self.collaborators.count_live(note_id).await
    }
}
