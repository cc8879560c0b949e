//! Collaborator HTTP handlers.
//!
//! Grants are capped at two per note and managed by the owner only; the
//! services below surface those rules as 400/403/409 responses.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{Actor, ApiError, AppState};
use vellum_core::{CollaborationSummary, CollaboratorEntry, CollaboratorRole};

/// Request body for adding a collaborator, by user id or by email.
#[derive(Debug, Deserialize)]
pub struct AddCollaboratorRequest {
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    #[serde(default)]
    pub role: CollaboratorRole,
}

/// Add a collaborator to a note. Owner only; denied while locked.
///
/// # Returns
/// - 201 Created with the grant
/// - 400 Bad Request at the cap, on self-grant, or with neither
///   `user_id` nor `email`
/// - 404 Not Found if the grantee does not exist
/// - 409 Conflict on a duplicate grant
pub async fn add_collaborator(
    State(state): State<AppState>,
    actor: Actor,
    Path(note_id): Path<Uuid>,
    Json(req): Json<AddCollaboratorRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let grant = match (req.user_id, req.email) {
        (Some(user_id), _) => state.sharing.grant(note_id, user_id, actor.0, req.role).await?,
        (None, Some(email)) => {
            state
                .sharing
                .grant_by_email(note_id, &email, actor.0, req.role)
                .await?
        }
        (None, None) => {
            return Err(ApiError::BadRequest(
                "either user_id or email is required".to_string(),
            ))
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "note_id": grant.note_id,
            "user_id": grant.user_id,
            "role": grant.role,
        })),
    ))
}

/// List a note's collaborators. Owner and collaborators may list.
pub async fn list_collaborators(
    State(state): State<AppState>,
    actor: Actor,
    Path(note_id): Path<Uuid>,
) -> Result<Json<Vec<CollaboratorEntry>>, ApiError> {
    let entries = state.sharing.list_by_note(note_id, actor.0).await?;
    Ok(Json(entries))
}

/// Remove a collaborator. Owner only; removing a user who holds no grant
/// reports `"removed": false` rather than failing.
pub async fn remove_collaborator(
    State(state): State<AppState>,
    actor: Actor,
    Path((note_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let removed = state.sharing.revoke(note_id, user_id, actor.0).await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}

/// The caller's "my collaborations" view.
pub async fn my_collaborations(
    State(state): State<AppState>,
    actor: Actor,
) -> Result<Json<Vec<CollaborationSummary>>, ApiError> {
    let summaries = state.sharing.list_by_user(actor.0).await?;
    Ok(Json(summaries))
}
