//! Note lifecycle: creation, folder counters, update gating, owner-only
//! deletion with its cascades, and the end-to-end scenario.

mod helpers;

use helpers::{services, MemBackend};
use vellum_core::{
    CollaboratorRole, Error, FolderDraft, FolderStore, NoteDraft, NotePatch, UnlockOutcome,
};

fn note_draft(owner: uuid::Uuid, title: &str, folder: Option<uuid::Uuid>) -> NoteDraft {
    NoteDraft {
        owner_id: owner,
        title: title.to_string(),
        description: Some("body".to_string()),
        folder_id: folder,
        color: None,
        is_pinned: false,
    }
}

fn folder_draft(owner: uuid::Uuid, name: &str) -> FolderDraft {
    FolderDraft {
        owner_id: owner,
        name: name.to_string(),
        tag: None,
        color: None,
    }
}

#[tokio::test]
async fn test_create_requires_title() {
    let backend = MemBackend::new();
    let (notes, _, _, _) = services(&backend);
    let owner = backend.add_user("olivia", "olivia@example.com");

    let err = notes
        .create(owner, note_draft(owner, "   ", None))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_create_in_folder_increments_counter() {
    let backend = MemBackend::new();
    let (notes, _, _, folders) = services(&backend);
    let owner = backend.add_user("olivia", "olivia@example.com");

    let folder_id = folders
        .create(owner, folder_draft(owner, "Work"))
        .await
        .unwrap();
    notes
        .create(owner, note_draft(owner, "Standup", Some(folder_id)))
        .await
        .unwrap();

    assert_eq!(backend.folder(folder_id).notes_amount, 1);
}

#[tokio::test]
async fn test_create_in_missing_folder_fails() {
    let backend = MemBackend::new();
    let (notes, _, _, _) = services(&backend);
    let owner = backend.add_user("olivia", "olivia@example.com");

    let err = notes
        .create(owner, note_draft(owner, "Lost", Some(uuid::Uuid::new_v4())))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::FolderNotFound(_)));
}

#[tokio::test]
async fn test_update_advances_updated_at() {
    let backend = MemBackend::new();
    let (notes, _, _, _) = services(&backend);
    let owner = backend.add_user("olivia", "olivia@example.com");

    let note_id = notes
        .create(owner, note_draft(owner, "Stamp", None))
        .await
        .unwrap();
    let before = backend.note(note_id).updated_at;

    notes
        .update(
            note_id,
            owner,
            NotePatch {
                title: Some("Stamped".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let after = backend.note(note_id);
    assert_eq!(after.title, "Stamped");
    assert!(after.updated_at >= before);
}

#[tokio::test]
async fn test_folder_move_adjusts_both_counters() {
    let backend = MemBackend::new();
    let (notes, _, _, folders) = services(&backend);
    let owner = backend.add_user("olivia", "olivia@example.com");

    let from = folders
        .create(owner, folder_draft(owner, "From"))
        .await
        .unwrap();
    let to = folders
        .create(owner, folder_draft(owner, "To"))
        .await
        .unwrap();
    let note_id = notes
        .create(owner, note_draft(owner, "Mover", Some(from)))
        .await
        .unwrap();
    assert_eq!(backend.folder(from).notes_amount, 1);

    notes
        .update(
            note_id,
            owner,
            NotePatch {
                folder_id: Some(Some(to)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(backend.folder(from).notes_amount, 0);
    assert_eq!(backend.folder(to).notes_amount, 1);

    // Detaching from the folder decrements without incrementing anything.
    notes
        .update(
            note_id,
            owner,
            NotePatch {
                folder_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(backend.folder(to).notes_amount, 0);
}

#[tokio::test]
async fn test_folder_counter_floors_at_zero() {
    let backend = MemBackend::new();
    let (_, _, _, folders) = services(&backend);
    let owner = backend.add_user("olivia", "olivia@example.com");

    let folder_id = folders
        .create(owner, folder_draft(owner, "Empty"))
        .await
        .unwrap();

    // Decrement at zero is a silent no-op.
    backend.decrement_notes_amount(folder_id).await.unwrap();
    assert_eq!(backend.folder(folder_id).notes_amount, 0);
}

#[tokio::test]
async fn test_collaborator_cannot_delete() {
    let backend = MemBackend::new();
    let (notes, sharing, _, _) = services(&backend);

    let owner = backend.add_user("olivia", "olivia@example.com");
    let alice = backend.add_user("alice", "alice@example.com");

    let note_id = notes
        .create(owner, note_draft(owner, "Keep", None))
        .await
        .unwrap();
    sharing
        .grant(note_id, alice, owner, CollaboratorRole::Editor)
        .await
        .unwrap();

    assert!(matches!(
        notes.delete(note_id, alice).await.unwrap_err(),
        Error::OwnerOnly
    ));
}

#[tokio::test]
async fn test_delete_cascades_grants_and_counter() {
    let backend = MemBackend::new();
    let (notes, sharing, _, folders) = services(&backend);

    let owner = backend.add_user("olivia", "olivia@example.com");
    let a = backend.add_user("a", "a@example.com");
    let b = backend.add_user("b", "b@example.com");

    let folder_id = folders
        .create(owner, folder_draft(owner, "Shared"))
        .await
        .unwrap();
    let note_id = notes
        .create(owner, note_draft(owner, "Cascade", Some(folder_id)))
        .await
        .unwrap();
    sharing
        .grant(note_id, a, owner, CollaboratorRole::Editor)
        .await
        .unwrap();
    sharing
        .grant(note_id, b, owner, CollaboratorRole::Editor)
        .await
        .unwrap();
    assert_eq!(backend.folder(folder_id).notes_amount, 1);

    notes.delete(note_id, owner).await.unwrap();

    assert_eq!(sharing.count_live(note_id).await.unwrap(), 0);
    assert!(!sharing.has_grant(note_id, a).await.unwrap());
    assert!(!sharing.has_grant(note_id, b).await.unwrap());
    assert_eq!(backend.folder(folder_id).notes_amount, 0);
}

#[tokio::test]
async fn test_owner_may_delete_locked_note_without_pin() {
    let backend = MemBackend::new();
    let (notes, _, lock, _) = services(&backend);

    let owner = backend.add_user("olivia", "olivia@example.com");
    let note_id = notes
        .create(owner, note_draft(owner, "Doomed", None))
        .await
        .unwrap();
    lock.lock(note_id, owner, "4242").await.unwrap();

    // Deletion is not gated by lock state.
    notes.delete(note_id, owner).await.unwrap();
    assert!(matches!(
        notes.get(note_id, owner).await.unwrap_err(),
        Error::NoteNotFound(_)
    ));
}

#[tokio::test]
async fn test_listing_flags_collaborations() {
    let backend = MemBackend::new();
    let (notes, sharing, _, _) = services(&backend);

    let owner = backend.add_user("olivia", "olivia@example.com");
    let alice = backend.add_user("alice", "alice@example.com");

    let own = notes
        .create(alice, note_draft(alice, "Mine", None))
        .await
        .unwrap();
    let shared = notes
        .create(owner, note_draft(owner, "Theirs", None))
        .await
        .unwrap();
    sharing
        .grant(shared, alice, owner, CollaboratorRole::Editor)
        .await
        .unwrap();

    let listed = notes.list_for_user(alice).await.unwrap();
    assert_eq!(listed.len(), 2);
    let own_entry = listed.iter().find(|v| v.id == own).unwrap();
    let shared_entry = listed.iter().find(|v| v.id == shared).unwrap();
    assert!(!own_entry.is_collaboration);
    assert!(shared_entry.is_collaboration);
}

#[tokio::test]
async fn test_folder_listing_filters_by_access() {
    let backend = MemBackend::new();
    let (notes, _, _, folders) = services(&backend);

    let owner = backend.add_user("olivia", "olivia@example.com");
    let other = backend.add_user("oscar", "oscar@example.com");

    let folder_id = folders
        .create(owner, folder_draft(owner, "Mixed"))
        .await
        .unwrap();
    notes
        .create(owner, note_draft(owner, "Visible", Some(folder_id)))
        .await
        .unwrap();

    let for_owner = notes.list_by_folder(folder_id, owner).await.unwrap();
    assert_eq!(for_owner.len(), 1);

    let for_other = notes.list_by_folder(folder_id, other).await.unwrap();
    assert!(for_other.is_empty());
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let backend = MemBackend::new();
    let (notes, sharing, lock, folders) = services(&backend);

    let o = backend.add_user("o", "o@example.com");
    let a = backend.add_user("a", "a@example.com");
    let b = backend.add_user("b", "b@example.com");
    let c = backend.add_user("c", "c@example.com");

    // O creates note N in folder F (amount 0 → 1).
    let f = folders.create(o, folder_draft(o, "F")).await.unwrap();
    let n = notes
        .create(o, note_draft(o, "N", Some(f)))
        .await
        .unwrap();
    assert_eq!(backend.folder(f).notes_amount, 1);

    // Adds collaborators A and B (count = 2); C fails at the cap.
    sharing.grant(n, a, o, CollaboratorRole::Editor).await.unwrap();
    sharing.grant(n, b, o, CollaboratorRole::Editor).await.unwrap();
    assert!(matches!(
        sharing.grant(n, c, o, CollaboratorRole::Editor).await.unwrap_err(),
        Error::CollaboratorLimitExceeded(2)
    ));

    // O locks N with PIN "4242".
    lock.lock(n, o, "4242").await.unwrap();

    // A views with "4242" → content returned, state still Locked.
    let view = lock.view(n, a, Some("4242")).await.unwrap();
    assert_eq!(view.description.as_deref(), Some("body"));
    assert!(backend.note(n).is_locked);

    // A views with "0000" → InvalidPin.
    assert!(matches!(
        lock.view(n, a, Some("0000")).await.unwrap_err(),
        Error::InvalidPin
    ));

    // O unlocks with "4242" → state Unlocked.
    assert_eq!(
        lock.unlock(n, o, "4242").await.unwrap(),
        UnlockOutcome::Permanent
    );
    assert!(!backend.note(n).is_locked);

    // O deletes N → folder amount 1 → 0, grants for A and B gone.
    notes.delete(n, o).await.unwrap();
    assert_eq!(backend.folder(f).notes_amount, 0);
    assert_eq!(sharing.count_live(n).await.unwrap(), 0);
}
