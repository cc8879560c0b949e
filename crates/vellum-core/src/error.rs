//! Error types for vellum.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using vellum's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vellum operations.
///
/// The access-control and lock variants are expected, recoverable outcomes
/// returned to the boundary layer as typed results. Only `Database`, `Hash`,
/// and `Internal` represent genuine infrastructure faults.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Note not found
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    /// Folder not found
    #[error("Folder not found: {0}")]
    FolderNotFound(Uuid),

    /// Grantee does not resolve in the identity directory
    #[error("Unknown user: {0}")]
    UnknownUser(String),

    /// Actor has neither ownership nor a live grant on the note
    #[error("You do not have access to this note")]
    NotAuthorized,

    /// Action reserved to the note owner
    #[error("Only the note owner can perform this action")]
    OwnerOnly,

    /// Content mutation blocked by lock state
    #[error("Note is locked; unlock it first")]
    NoteLocked,

    /// Lock transition attempted on an already-locked note
    #[error("Note is already locked")]
    AlreadyLocked,

    /// Unlock attempted on a note that is not locked
    #[error("Note is not locked")]
    NotLocked,

    /// PIN hash comparison failed
    #[error("Invalid PIN")]
    InvalidPin,

    /// PIN shorter than the minimum-length policy
    #[error("PIN must be at least {0} characters")]
    PinTooShort(usize),

    /// A live grant already exists for this (note, user) pair
    #[error("User is already a collaborator")]
    AlreadyCollaborator,

    /// The note already carries the maximum number of live grants
    #[error("Maximum {0} collaborators allowed per note")]
    CollaboratorLimitExceeded(usize),

    /// The note owner cannot be granted collaborator access to their own note
    #[error("Cannot add the note owner as collaborator")]
    SelfGrantNotAllowed,

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// PIN hashing or hash parsing failed
    #[error("Hash error: {0}")]
    Hash(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error is an expected domain outcome (as opposed to an
    /// infrastructure fault that should surface as a generic failure).
    pub fn is_expected(&self) -> bool {
        !matches!(
            self,
            Error::Database(_) | Error::Hash(_) | Error::Internal(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_note_not_found() {
        let id = Uuid::nil();
        let err = Error::NoteNotFound(id);
        assert_eq!(err.to_string(), format!("Note not found: {}", id));
    }

    #[test]
    fn test_error_display_pin_too_short() {
        let err = Error::PinTooShort(4);
        assert_eq!(err.to_string(), "PIN must be at least 4 characters");
    }

    #[test]
    fn test_error_display_collaborator_limit() {
        let err = Error::CollaboratorLimitExceeded(2);
        assert_eq!(err.to_string(), "Maximum 2 collaborators allowed per note");
    }

    #[test]
    fn test_expected_classification() {
        assert!(Error::NoteLocked.is_expected());
        assert!(Error::InvalidPin.is_expected());
        assert!(Error::SelfGrantNotAllowed.is_expected());
        assert!(!Error::Hash("argon2 failure".to_string()).is_expected());
        assert!(!Error::Internal("unexpected state".to_string()).is_expected());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
