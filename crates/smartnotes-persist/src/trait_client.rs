use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::Result;
use crate::models::{AuthState, NewNote, Note, NoteId, NotePatch, Session, User};

/// Remote notes collection
///
/// A generic record store. Ownership is enforced by the store itself (row
/// level security for Supabase); callers only pass the owner on select and
/// insert.
#[async_trait]
pub trait NotesBackend: Send + Sync {
    /// All records owned by `owner`, newest `created_at` first
    async fn select_notes(&self, owner: &str) -> Result<Vec<Note>>;

    /// Insert one record and return it with store-assigned id and timestamps
    async fn insert_note(&self, note: NewNote) -> Result<Note>;

    /// Update the record matching `id`; `NotFound` when no visible record matches
    async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<Note>;

    /// Delete the record matching `id`. Deleting an absent record succeeds.
    async fn delete_note(&self, id: &NoteId) -> Result<()>;
}

/// Authentication capability
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session>;

    /// Register a new account. Verification happens out-of-band.
    async fn sign_up(&self, email: &str, password: &str) -> Result<()>;

    async fn sign_out(&self) -> Result<()>;

    /// The user of the current session, if it is still valid
    async fn current_user(&self) -> Result<Option<User>>;

    /// Auth-state changes; the receiver starts at the current state
    fn subscribe(&self) -> watch::Receiver<AuthState>;
}
