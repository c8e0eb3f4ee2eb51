use std::sync::Arc;

use crate::error::{PersistError, Result};
use crate::models::{NewNote, Note, NoteId, NotePatch, User};
use crate::trait_client::{AuthProvider, NotesBackend};

/// Note Store Client
///
/// Translates note operations into calls against the remote collection,
/// scoped to the currently authenticated user. Every call is a single
/// attempt; retrying is left to the caller.
#[derive(Clone)]
pub struct NoteStoreClient {
    backend: Arc<dyn NotesBackend>,
    auth: Arc<dyn AuthProvider>,
}

impl NoteStoreClient {
    pub fn new(backend: Arc<dyn NotesBackend>, auth: Arc<dyn AuthProvider>) -> Self {
        Self { backend, auth }
    }

    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    /// All notes of the current user, newest first
    pub async fn list_notes(&self) -> Result<Vec<Note>> {
        let user = self.require_user().await?;
        let mut notes = self.backend.select_notes(&user.id).await?;

        // Stable sort keeps the store's order for equal timestamps
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        tracing::debug!(user_id = %user.id, count = notes.len(), "listed notes");
        Ok(notes)
    }

    /// Create a note owned by the current user
    pub async fn create_note(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Note> {
        let user = self.require_user().await?;
        let note = self
            .backend
            .insert_note(NewNote {
                title: title.into(),
                content: content.into(),
                user_id: user.id,
            })
            .await?;

        tracing::debug!(note_id = %note.id, "created note");
        Ok(note)
    }

    /// Apply only the fields present in `patch`
    pub async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<Note> {
        self.require_user().await?;
        let note = self.backend.update_note(id, patch).await?;
        if note.id != *id {
            return Err(PersistError::Internal(format!(
                "store returned note {} for update of {}",
                note.id, id
            )));
        }

        tracing::debug!(note_id = %id, "updated note");
        Ok(note)
    }

    /// Delete a note; an already-deleted id counts as success
    pub async fn delete_note(&self, id: &NoteId) -> Result<()> {
        self.require_user().await?;
        self.backend.delete_note(id).await?;

        tracing::debug!(note_id = %id, "deleted note");
        Ok(())
    }

    async fn require_user(&self) -> Result<User> {
        self.auth
            .current_user()
            .await?
            .ok_or(PersistError::NotAuthenticated)
    }
}
