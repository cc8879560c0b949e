//! Folder HTTP handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Actor, ApiError, AppState};
use vellum_core::{Error, Folder, FolderDraft, FolderPatch, NoteView};

use super::double_option;

/// Request body for creating a folder.
#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub name: String,
    pub tag: Option<String>,
    pub color: Option<i64>,
}

/// Request body for a partial folder update.
#[derive(Debug, Deserialize)]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub tag: Option<Option<String>>,
    pub color: Option<i64>,
}

/// Create a folder owned by the caller.
pub async fn create_folder(
    State(state): State<AppState>,
    actor: Actor,
    Json(req): Json<CreateFolderRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let draft = FolderDraft {
        owner_id: actor.0,
        name: req.name,
        tag: req.tag,
        color: req.color,
    };

    let id = state.folders.create(actor.0, draft).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "id": id }))))
}

/// List the caller's folders.
pub async fn list_folders(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<Folder>>, ApiError> {
    let folders = state.folders.list(actor.0).await?;
    Ok(Json(folders))
}

/// Fetch a single folder. Folders are private to their owner.
pub async fn get_folder(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Folder>, ApiError> {
    let folder = state.folders.get(id).await?;
    if folder.owner_id != actor.0 {
        return Err(ApiError::Core(Error::NotAuthorized));
    }
    Ok(Json(folder))
}

/// Apply a partial update to a folder.
pub async fn update_folder(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateFolderRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let patch = FolderPatch {
        name: req.name,
        tag: req.tag,
        color: req.color,
    };

    state.folders.update(id, actor.0, patch).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Delete a folder. Its notes are detached, not deleted.
pub async fn delete_folder(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.folders.delete(id, actor.0).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// List the notes in a folder that the caller may read.
pub async fn list_folder_notes(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<NoteView>>, ApiError> {
    let views = state.notes.list_by_folder(id, actor.0).await?;
    Ok(Json(views))
}
