//! Note HTTP handlers: CRUD plus the lock lifecycle endpoints.
//!
//! The default read paths return redacted views of locked notes; full
//! content of a locked note is only available through the PIN-gated
//! `/view` endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Actor, ApiError, AppState};
use vellum_core::{NoteDraft, NotePatch, NoteView};

use super::double_option;

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Request body for creating a note.
#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub description: Option<String>,
    pub folder_id: Option<Uuid>,
    pub color: Option<i64>,
    #[serde(default)]
    pub is_pinned: bool,
}

/// Request body for a partial note update. Omitted fields are unchanged;
/// explicit nulls clear the nullable fields.
#[derive(Debug, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub folder_id: Option<Option<Uuid>>,
    pub color: Option<i64>,
    pub is_pinned: Option<bool>,
}

/// Request body for locking or unlocking a note.
#[derive(Debug, Deserialize)]
pub struct PinRequest {
    pub pin: String,
}

/// Request body for viewing a note. The PIN is only required while the
/// note is locked.
#[derive(Debug, Deserialize, Default)]
pub struct ViewNoteRequest {
    pub pin: Option<String>,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Create a note owned by the caller.
///
/// # Returns
/// - 201 Created with `{ "id": "<uuid>" }`
/// - 400 Bad Request if the title is blank or the folder does not exist
pub async fn create_note(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let draft = NoteDraft {
        owner_id: actor.0,
        title: req.title,
        description: req.description,
        folder_id: req.folder_id,
        color: req.color,
        is_pinned: req.is_pinned,
    };

    let id = state.notes.create(actor.0, draft).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// List the caller's notes plus their collaborations.
pub async fn list_notes(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<NoteView>>, ApiError> {
    let views = state.notes.list_for_user(actor.0).await?;
    Ok(Json(views))
}

/// Fetch a single note. Locked descriptions are redacted.
pub async fn get_note(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<NoteView>, ApiError> {
    let view = state.notes.get(id, actor.0).await?;
    Ok(Json(view))
}

/// Apply a partial update. Fails with 423 while the note is locked.
pub async fn update_note(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let patch = NotePatch {
        title: req.title,
        description: req.description,
        folder_id: req.folder_id,
        color: req.color,
        is_pinned: req.is_pinned,
    };

    state.notes.update(id, actor.0, patch).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Delete a note. Owner only; a locked note can be deleted without its PIN.
pub async fn delete_note(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.notes.delete(id, actor.0).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Lock a note with a PIN. Owner only.
pub async fn lock_note(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<PinRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.lock.lock(id, actor.0, &req.pin).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Verify the PIN and unlock.
///
/// For the owner this clears the lock; for a collaborator the note stays
/// locked and the response carries `"temporary": true`.
pub async fn unlock_note(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<PinRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let outcome = state.lock.unlock(id, actor.0, &req.pin).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "temporary": outcome.is_temporary(),
    })))
}

/// Return full note content without changing lock state. A locked note
/// requires the correct PIN in the body.
pub async fn view_note(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<ViewNoteRequest>,
) -> Result<Json<NoteView>, ApiError> {
    let view = state.lock.view(id, actor.0, req.pin.as_deref()).await?;
    Ok(Json(view))
}
