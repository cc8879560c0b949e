//! Structured logging field name constants for vellum.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//!
//! PINs and PIN hashes are never logged at any level.

/// Subsystem originating the log event.
/// Values: "api", "core", "db"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "lock", "sharing", "notes", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "lock", "grant", "update", "delete"
pub const OPERATION: &str = "op";

/// Note UUID being operated on.
pub const NOTE_ID: &str = "note_id";

/// Acting or affected user UUID.
pub const USER_ID: &str = "user_id";

/// Folder UUID being operated on.
pub const FOLDER_ID: &str = "folder_id";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of entries returned by a listing.
pub const RESULT_COUNT: &str = "result_count";

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
