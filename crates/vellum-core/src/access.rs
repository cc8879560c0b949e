//! Note access guard: the pure decision function consulted before every
//! note operation.
//!
//! Ownership is checked before collaboration status. Every denial carries a
//! distinguishable reason so the boundary layer can map it to an
//! externally-visible failure without the core knowing about transport
//! codes.

use uuid::Uuid;

use crate::error::Error;
use crate::models::Note;

/// The intended operation on a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Metadata/listing read and unlocked content read. Locked content
    /// still passes this gate for existence/visibility; disclosure goes
    /// through the PIN-verified view flow.
    Read,
    /// Update of title/description/folder/display fields.
    Update,
    /// Delete the note. Owner only; not gated by lock state.
    Delete,
    /// Add or remove collaborator grants.
    ManageCollaborators,
    /// Transition Unlocked → Locked.
    Lock,
    /// Transition Locked → Unlocked (permanent, owner only).
    UnlockPermanent,
    /// Prove knowledge of the PIN for a single request (owner or
    /// collaborator).
    VerifyPin,
}

/// The actor's relationship to the note, carried on every permit so call
/// sites can branch on role without re-deriving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Collaborator,
}

/// Why an operation was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No ownership, no live grant.
    NotAuthorized,
    /// Action reserved to the owner.
    OwnerOnly,
    /// Content mutation blocked by lock state.
    NoteLocked,
    /// Lock transition attempted while already locked.
    AlreadyLocked,
}

/// Outcome of an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Permit(Role),
    Deny(DenyReason),
}

impl Decision {
    /// Convert to a `Result`, turning a denial into its typed error.
    pub fn into_result(self) -> Result<Role, Error> {
        match self {
            Decision::Permit(role) => Ok(role),
            Decision::Deny(reason) => Err(reason.into()),
        }
    }
}

impl From<DenyReason> for Error {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::NotAuthorized => Error::NotAuthorized,
            DenyReason::OwnerOnly => Error::OwnerOnly,
            DenyReason::NoteLocked => Error::NoteLocked,
            DenyReason::AlreadyLocked => Error::AlreadyLocked,
        }
    }
}

/// Decide whether `actor_id` may perform `op` on `note`.
///
/// `has_grant` is the caller-supplied answer to "does the actor hold a live
/// collaborator grant on this note" — the guard itself is pure and performs
/// no lookups.
pub fn decide(actor_id: Uuid, note: &Note, has_grant: bool, op: Operation) -> Decision {
    let role = if note.is_owned_by(actor_id) {
        Some(Role::Owner)
    } else if has_grant {
        Some(Role::Collaborator)
    } else {
        None
    };

    let Some(role) = role else {
        return Decision::Deny(DenyReason::NotAuthorized);
    };

    match op {
        Operation::Read | Operation::VerifyPin => Decision::Permit(role),
        Operation::Update => {
            if note.is_locked {
                Decision::Deny(DenyReason::NoteLocked)
            } else {
                Decision::Permit(role)
            }
        }
        Operation::Delete => match role {
            Role::Owner => Decision::Permit(role),
            Role::Collaborator => Decision::Deny(DenyReason::OwnerOnly),
        },
        Operation::ManageCollaborators => match role {
            Role::Collaborator => Decision::Deny(DenyReason::OwnerOnly),
            Role::Owner if note.is_locked => Decision::Deny(DenyReason::NoteLocked),
            Role::Owner => Decision::Permit(role),
        },
        Operation::Lock => match role {
            Role::Collaborator => Decision::Deny(DenyReason::OwnerOnly),
            Role::Owner if note.is_locked => Decision::Deny(DenyReason::AlreadyLocked),
            Role::Owner => Decision::Permit(role),
        },
        Operation::UnlockPermanent => match role {
            Role::Owner => Decision::Permit(role),
            Role::Collaborator => Decision::Deny(DenyReason::OwnerOnly),
        },
    }
}
