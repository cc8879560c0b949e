//! Lock state machine for notes.
//!
//! Two states, `Unlocked` and `Locked`; notes start unlocked. The owner
//! locks a note with a PIN and is the only one who can permanently unlock
//! it. A collaborator presenting the correct PIN gets a *temporary* outcome:
//! the PIN is accepted for that request only and the note stays locked.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::access::{decide, Operation, Role};
use crate::error::{Error, Result};
use crate::models::{Note, NoteView};
use crate::pin;
use crate::traits::{CollaboratorStore, NoteStore};

/// Outcome of a successful `unlock` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    /// Owner call: state transitioned to `Unlocked`, PIN hash cleared.
    Permanent,
    /// Collaborator call: PIN accepted for this request only, note remains
    /// locked. Deliberate asymmetry, not a bug.
    Temporary,
}

impl UnlockOutcome {
    /// Whether this outcome left the note locked.
    pub fn is_temporary(&self) -> bool {
        matches!(self, UnlockOutcome::Temporary)
    }
}

/// Service governing a note's lock lifecycle.
pub struct LockService {
    notes: Arc<dyn NoteStore>,
    collaborators: Arc<dyn CollaboratorStore>,
}

impl LockService {
    pub fn new(notes: Arc<dyn NoteStore>, collaborators: Arc<dyn CollaboratorStore>) -> Self {
        Self {
            notes,
            collaborators,
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

    /// Transition `Unlocked → Locked`. Owner only.
    pub async fn lock(&self, note_id: Uuid, actor_id: Uuid, pin: &str) -> Result<()> {
        pin::validate_pin(pin)?;

        let note = self.fetch_note(note_id).await?;
        self.resolve_role(actor_id, &note, Operation::Lock).await?;

        let hash = pin::hash_pin(pin)?;
        self.notes.set_lock(note_id, &hash).await?;

        info!(
            subsystem = "core",
            component = "lock",
            op = "lock",
            note_id = %note_id,
            user_id = %actor_id,
            "Note locked"
        );
        Ok(())
    }

    /// Verify the PIN and, for the owner, transition `Locked → Unlocked`.
    ///
    /// A collaborator with the correct PIN gets [`UnlockOutcome::Temporary`]
    /// and the note stays locked.
    pub async fn unlock(&self, note_id: Uuid, actor_id: Uuid, pin: &str) -> Result<UnlockOutcome> {
        let note = self.fetch_note(note_id).await?;
        let role = self
            .resolve_role(actor_id, &note, Operation::VerifyPin)
            .await?;

        if !note.is_locked {
            return Err(Error::NotLocked);
        }

        self.check_pin(&note, pin).await?;

        match role {
            Role::Owner => {
                // The permanent transition runs through the guard as its own
                // operation, not just as a role branch.
                decide(actor_id, &note, false, Operation::UnlockPermanent).into_result()?;
                self.notes.clear_lock(note_id).await?;
                info!(
                    subsystem = "core",
                    component = "lock",
                    op = "unlock",
                    note_id = %note_id,
                    user_id = %actor_id,
                    "Note unlocked by owner"
                );
                Ok(UnlockOutcome::Permanent)
            }
            Role::Collaborator => {
                debug!(
                    subsystem = "core",
                    component = "lock",
                    op = "unlock_temporary",
                    note_id = %note_id,
                    user_id = %actor_id,
                    "PIN accepted for collaborator; note remains locked"
                );
                Ok(UnlockOutcome::Temporary)
            }
        }
    }

    /// Return full note content without changing lock state.
    ///
    /// Unlocked notes are returned unconditionally (subject to the read
    /// rule). Locked notes require a verified PIN; success discloses the
    /// content for this call only.
    pub async fn view(
        &self,
        note_id: Uuid,
        actor_id: Uuid,
        pin: Option<&str>,
    ) -> Result<NoteView> {
        let note = self.fetch_note(note_id).await?;
        let role = self.resolve_role(actor_id, &note, Operation::Read).await?;
        let is_collaboration = role == Role::Collaborator;

        if !note.is_locked {
            return Ok(NoteView::unredacted(&note, is_collaboration));
        }

        let pin = pin.ok_or(Error::InvalidPin)?;
        self.check_pin(&note, pin).await?;

        debug!(
            subsystem = "core",
            component = "lock",
            op = "view",
            note_id = %note_id,
            user_id = %actor_id,
            "PIN-verified view of locked note"
        );
        Ok(NoteView::unredacted(&note, is_collaboration))
    }

    async fn check_pin(&self, note: &Note, pin: &str) -> Result<()> {
        let hash = self
            .notes
            .get_pin_hash(note.id)
            .await?
            .ok_or_else(|| Error::Internal(format!("locked note {} has no pin hash", note.id)))?;

        if pin::verify_pin(pin, &hash)? {
            Ok(())
        } else {
            Err(Error::InvalidPin)
        }
    }
}
