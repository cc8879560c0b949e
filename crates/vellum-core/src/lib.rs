//! # vellum-core
//!
//! Core types, traits, and access-control services for the vellum
//! note-taking backend.
//!
//! This crate owns the rules that decide, for any (user, note) pair,
//! whether an operation is permitted: the access guard, the lock state
//! machine, and the collaboration registry. Persistence and transport are
//! external collaborators reached through the traits in [`traits`].

pub mod access;
pub mod error;
pub mod folders;
pub mod lock;
pub mod logging;
pub mod models;
pub mod notes;
pub mod pin;
pub mod sharing;
pub mod traits;

// Re-export commonly used types at crate root
pub use access::{decide, Decision, DenyReason, Operation, Role};
pub use error::{Error, Result};
pub use folders::FolderService;
pub use lock::{LockService, UnlockOutcome};
pub use models::*;
pub use notes::NoteService;
pub use pin::{hash_pin, validate_pin, verify_pin, MIN_PIN_LENGTH};
pub use sharing::{SharingService, MAX_COLLABORATORS};
pub use traits::*;
