//! Folder CRUD orchestration.
//!
//! Folders are a thin organizational layer; the only contract the core
//! relies on is the advisory `notes_amount` counter, which is adjusted by
//! the note service and never recomputed here.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Folder, FolderDraft, FolderPatch};
use crate::traits::FolderStore;

/// Service for folder lifecycle operations.
pub struct FolderService {
    folders: Arc<dyn FolderStore>,
}

impl FolderService {
    pub fn new(folders: Arc<dyn FolderStore>) -> Self {
        Self { folders }
    }

    pub async fn create(&self, actor_id: Uuid, draft: FolderDraft) -> Result<Uuid> {
        if draft.name.trim().is_empty() {
            return Err(Error::InvalidInput("folder name is required".to_string()));
        }
        if draft.owner_id != actor_id {
            return Err(Error::NotAuthorized);
        }

        let folder_id = self.folders.create(draft).await?;
        info!(
            subsystem = "core",
            component = "folders",
            op = "create",
            folder_id = %folder_id,
            user_id = %actor_id,
            "Folder created"
        );
        Ok(folder_id)
    }

    pub async fn get(&self, folder_id: Uuid) -> Result<Folder> {
        self.folders
            .get(folder_id)
            .await?
            .ok_or(Error::FolderNotFound(folder_id))
    }

    pub async fn list(&self, owner_id: Uuid) -> Result<Vec<Folder>> {
        self.folders.list(owner_id).await
    }

    pub async fn update(&self, folder_id: Uuid, actor_id: Uuid, patch: FolderPatch) -> Result<()> {
        let folder = self.get(folder_id).await?;
        if folder.owner_id != actor_id {
            return Err(Error::NotAuthorized);
        }

        self.folders.update(folder_id, patch).await?;
        Ok(())
    }

    /// Delete a folder. Its notes are detached, not deleted.
    pub async fn delete(&self, folder_id: Uuid, actor_id: Uuid) -> Result<()> {
        let folder = self.get(folder_id).await?;
        if folder.owner_id != actor_id {
            return Err(Error::NotAuthorized);
        }

        self.folders.delete(folder_id).await?;
        info!(
            subsystem = "core",
            component = "folders",
            op = "delete",
            folder_id = %folder_id,
            user_id = %actor_id,
            "Folder deleted"
        );
        Ok(())
    }
}
