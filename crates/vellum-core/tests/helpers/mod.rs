//! In-memory trait implementations for service-level tests.
//!
//! `MemBackend` implements every repository trait over mutex-guarded maps,
//! mirroring the transactional guarantees the Postgres layer provides:
//! the grant insert enforces cap and uniqueness, `update_fields` re-checks
//! the lock flag, and the folder counter floors at zero.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use vellum_core::{
    CollaborationSummary, CollaboratorEntry, CollaboratorRole, CollaboratorStore, Error, Folder,
    FolderDraft, FolderPatch, FolderService, FolderStore, Grant, IdentityDirectory, LockService,
    Note, NoteDraft, NotePatch, NoteService, NoteStore, Result, SharingService, User,
    DEFAULT_COLOR, MAX_COLLABORATORS,
};

#[derive(Default)]
pub struct MemBackend {
    pub users: Mutex<HashMap<Uuid, User>>,
    pub notes: Mutex<HashMap<Uuid, Note>>,
    pub grants: Mutex<Vec<Grant>>,
    pub folders: Mutex<HashMap<Uuid, Folder>>,
}

impl MemBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_user(&self, username: &str, email: &str) -> Uuid {
        let id = Uuid::now_v7();
        self.users.lock().unwrap().insert(
            id,
            User {
                id,
                username: username.to_string(),
                email: email.to_string(),
            },
        );
        id
    }

    pub fn note(&self, id: Uuid) -> Note {
        self.notes.lock().unwrap().get(&id).cloned().unwrap()
    }

    pub fn folder(&self, id: Uuid) -> Folder {
        self.folders.lock().unwrap().get(&id).cloned().unwrap()
    }
}

/// Build the full service stack over a shared in-memory backend.
pub fn services(
    backend: &Arc<MemBackend>,
) -> (NoteService, SharingService, LockService, FolderService) {
    let notes: Arc<dyn NoteStore> = backend.clone();
    let collaborators: Arc<dyn CollaboratorStore> = backend.clone();
    let users: Arc<dyn IdentityDirectory> = backend.clone();
    let folders: Arc<dyn FolderStore> = backend.clone();

    (
        NoteService::new(notes.clone(), collaborators.clone(), folders.clone()),
        SharingService::new(notes.clone(), collaborators.clone(), users),
        LockService::new(notes, collaborators),
        FolderService::new(folders),
    )
}

#[async_trait]
impl IdentityDirectory for MemBackend {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[async_trait]
impl NoteStore for MemBackend {
    async fn create(&self, draft: NoteDraft) -> Result<Uuid> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        self.notes.lock().unwrap().insert(
            id,
            Note {
                id,
                owner_id: draft.owner_id,
                title: draft.title,
                description: draft.description,
                folder_id: draft.folder_id,
                color: draft.color.unwrap_or(DEFAULT_COLOR),
                is_pinned: draft.is_pinned,
                is_locked: false,
                lock_pin_hash: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Note>> {
        Ok(self.notes.lock().unwrap().get(&id).cloned())
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<Note>> {
        Ok(self
            .notes
            .lock()
            .unwrap()
            .values()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_by_folder(&self, folder_id: Uuid) -> Result<Vec<Note>> {
        Ok(self
            .notes
            .lock()
            .unwrap()
            .values()
            .filter(|n| n.folder_id == Some(folder_id))
            .cloned()
            .collect())
    }

    async fn update_fields(&self, id: Uuid, patch: NotePatch) -> Result<u64> {
        let mut notes = self.notes.lock().unwrap();
        let Some(note) = notes.get_mut(&id) else {
            return Ok(0);
        };
        if note.is_locked {
            return Err(Error::NoteLocked);
        }
        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(description) = patch.description {
            note.description = description;
        }
        if let Some(folder_id) = patch.folder_id {
            note.folder_id = folder_id;
        }
        if let Some(color) = patch.color {
            note.color = color;
        }
        if let Some(is_pinned) = patch.is_pinned {
            note.is_pinned = is_pinned;
        }
        note.updated_at = Utc::now();
        Ok(1)
    }

    async fn delete(&self, id: Uuid) -> Result<u64> {
        Ok(self.notes.lock().unwrap().remove(&id).map_or(0, |_| 1))
    }

    async fn set_lock(&self, id: Uuid, pin_hash: &str) -> Result<()> {
        let mut notes = self.notes.lock().unwrap();
        let note = notes.get_mut(&id).ok_or(Error::NoteNotFound(id))?;
        if note.is_locked {
            return Err(Error::AlreadyLocked);
        }
        note.is_locked = true;
        note.lock_pin_hash = Some(pin_hash.to_string());
        note.updated_at = Utc::now();
        Ok(())
    }

    async fn clear_lock(&self, id: Uuid) -> Result<()> {
        let mut notes = self.notes.lock().unwrap();
        let note = notes.get_mut(&id).ok_or(Error::NoteNotFound(id))?;
        note.is_locked = false;
        note.lock_pin_hash = None;
        note.updated_at = Utc::now();
        Ok(())
    }

    async fn get_pin_hash(&self, id: Uuid) -> Result<Option<String>> {
        Ok(self
            .notes
            .lock()
            .unwrap()
            .get(&id)
            .and_then(|n| n.lock_pin_hash.clone()))
    }
}

#[async_trait]
impl CollaboratorStore for MemBackend {
    async fn insert(
        &self,
        note_id: Uuid,
        user_id: Uuid,
        added_by: Uuid,
        role: CollaboratorRole,
    ) -> Result<Grant> {
        let mut grants = self.grants.lock().unwrap();
        if grants
            .iter()
            .any(|g| g.note_id == note_id && g.user_id == user_id)
        {
            return Err(Error::AlreadyCollaborator);
        }
        if grants.iter().filter(|g| g.note_id == note_id).count() >= MAX_COLLABORATORS {
            return Err(Error::CollaboratorLimitExceeded(MAX_COLLABORATORS));
        }
        let grant = Grant {
            note_id,
            user_id,
            added_by,
            role,
            created_at: Utc::now(),
        };
        grants.push(grant.clone());
        Ok(grant)
    }

    async fn remove(&self, note_id: Uuid, user_id: Uuid) -> Result<bool> {
        let mut grants = self.grants.lock().unwrap();
        let before = grants.len();
        grants.retain(|g| !(g.note_id == note_id && g.user_id == user_id));
        Ok(grants.len() < before)
    }

    async fn remove_all(&self, note_id: Uuid) -> Result<u64> {
        let mut grants = self.grants.lock().unwrap();
        let before = grants.len();
        grants.retain(|g| g.note_id != note_id);
        Ok((before - grants.len()) as u64)
    }

    async fn list_by_note(&self, note_id: Uuid) -> Result<Vec<CollaboratorEntry>> {
        let users = self.users.lock().unwrap();
        Ok(self
            .grants
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.note_id == note_id)
            .map(|g| {
                let user = users.get(&g.user_id).cloned().unwrap_or(User {
                    id: g.user_id,
                    username: String::new(),
                    email: String::new(),
                });
                CollaboratorEntry {
                    user_id: g.user_id,
                    username: user.username,
                    email: user.email,
                    role: g.role,
                    added_by: g.added_by,
                    created_at: g.created_at,
                }
            })
            .collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<CollaborationSummary>> {
        let notes = self.notes.lock().unwrap();
        let users = self.users.lock().unwrap();
        Ok(self
            .grants
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.user_id == user_id)
            .map(|g| {
                let (title, is_locked, owner) = notes
                    .get(&g.note_id)
                    .map(|n| (n.title.clone(), n.is_locked, n.owner_id))
                    .unwrap_or((String::new(), false, Uuid::nil()));
                CollaborationSummary {
                    note_id: g.note_id,
                    title,
                    is_locked,
                    role: g.role,
                    owner_username: users
                        .get(&owner)
                        .map(|u| u.username.clone())
                        .unwrap_or_default(),
                }
            })
            .collect())
    }

    async fn has_grant(&self, note_id: Uuid, user_id: Uuid) -> Result<bool> {
        Ok(self
            .grants
            .lock()
            .unwrap()
            .iter()
            .any(|g| g.note_id == note_id && g.user_id == user_id))
    }

    async fn count_live(&self, note_id: Uuid) -> Result<i64> {
        Ok(self
            .grants
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.note_id == note_id)
            .count() as i64)
    }
}

#[async_trait]
impl FolderStore for MemBackend {
    async fn create(&self, draft: FolderDraft) -> Result<Uuid> {
        let id = Uuid::now_v7();
        self.folders.lock().unwrap().insert(
            id,
            Folder {
                id,
                owner_id: draft.owner_id,
                name: draft.name,
                tag: draft.tag,
                color: draft.color.unwrap_or(DEFAULT_COLOR),
                notes_amount: 0,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Folder>> {
        Ok(self.folders.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self, owner_id: Uuid) -> Result<Vec<Folder>> {
        Ok(self
            .folders
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, patch: FolderPatch) -> Result<u64> {
        let mut folders = self.folders.lock().unwrap();
        let Some(folder) = folders.get_mut(&id) else {
            return Ok(0);
        };
        if let Some(name) = patch.name {
            folder.name = name;
        }
        if let Some(tag) = patch.tag {
            folder.tag = tag;
        }
        if let Some(color) = patch.color {
            folder.color = color;
        }
        Ok(1)
    }

    async fn delete(&self, id: Uuid) -> Result<u64> {
        for note in self.notes.lock().unwrap().values_mut() {
            if note.folder_id == Some(id) {
                note.folder_id = None;
            }
        }
        Ok(self.folders.lock().unwrap().remove(&id).map_or(0, |_| 1))
    }

    async fn increment_notes_amount(&self, id: Uuid) -> Result<()> {
        if let Some(folder) = self.folders.lock().unwrap().get_mut(&id) {
            folder.notes_amount += 1;
        }
        Ok(())
    }

    async fn decrement_notes_amount(&self, id: Uuid) -> Result<()> {
        if let Some(folder) = self.folders.lock().unwrap().get_mut(&id) {
            if folder.notes_amount > 0 {
                folder.notes_amount -= 1;
            }
        }
        Ok(())
    }
}
