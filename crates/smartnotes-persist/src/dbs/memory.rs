// In-memory implementation of both contracts, for tests and offline demos

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::{PersistError, Result};
use crate::models::{AuthState, NewNote, Note, NoteId, NotePatch, Session, User};
use crate::session::SessionCell;
use crate::trait_client::{AuthProvider, NotesBackend};

/// Operations that can be made to fail once via [`MemoryBackend::fail_next`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    Select,
    Insert,
    Update,
    Delete,
    SignIn,
}

struct Account {
    password: String,
    user: User,
}

/// Single-process stand-in for the hosted backend
///
/// Mirrors the remote semantics the client relies on: store-assigned ids and
/// timestamps, per-owner visibility, idempotent delete.
pub struct MemoryBackend {
    notes: RwLock<Vec<Note>>,
    accounts: RwLock<HashMap<String, Account>>,
    session: SessionCell,
    failures: Mutex<HashMap<FailPoint, PersistError>>,
    latency: RwLock<Option<Duration>>,
    last_created: Mutex<Option<DateTime<Utc>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            notes: RwLock::new(Vec::new()),
            accounts: RwLock::new(HashMap::new()),
            session: SessionCell::new(),
            failures: Mutex::new(HashMap::new()),
            latency: RwLock::new(None),
            last_created: Mutex::new(None),
        }
    }

    /// Backend with one registered account already signed in
    pub fn signed_in(email: &str) -> Arc<Self> {
        let backend = Arc::new(Self::new());
        let user = backend.register(email, "password");
        backend.session.set(Self::session_for(user));
        backend
    }

    /// Register an account without going through sign-up
    pub fn register(&self, email: &str, password: &str) -> User {
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: Some(email.to_string()),
        };
        if let Ok(mut accounts) = self.accounts.write() {
            accounts.insert(
                email.to_string(),
                Account {
                    password: password.to_string(),
                    user: user.clone(),
                },
            );
        }
        user
    }

    /// Make the next call hitting `point` fail with `error`
    pub fn fail_next(&self, point: FailPoint, error: PersistError) {
        if let Ok(mut failures) = self.failures.lock() {
            failures.insert(point, error);
        }
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut guard) = self.latency.write() {
            *guard = latency;
        }
    }

    /// Every stored note regardless of owner
    pub fn all_notes(&self) -> Vec<Note> {
        self.notes.read().map(|n| n.clone()).unwrap_or_default()
    }

    /// Insert a note directly, bypassing sessions (seeding other users' data)
    pub fn seed(&self, owner: &str, title: &str, content: &str) -> Note {
        let note = self.build_note(NewNote {
            title: title.to_string(),
            content: content.to_string(),
            user_id: owner.to_string(),
        });
        if let Ok(mut notes) = self.notes.write() {
            notes.push(note.clone());
        }
        note
    }

    fn session_for(user: User) -> Session {
        Session {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: None,
            expires_at: None,
            user,
        }
    }

    async fn enter(&self, point: FailPoint) -> Result<()> {
        let latency = self.latency.read().ok().and_then(|l| *l);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let injected = self.failures.lock().ok().and_then(|mut f| f.remove(&point));
        match injected {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn caller(&self) -> Result<User> {
        self.session.user().ok_or_else(|| PersistError::Remote {
            status: 401,
            message: "JWT required".to_string(),
        })
    }

    // created_at is strictly increasing so ordering is deterministic
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.last_created.lock() {
            Ok(mut last) => {
                let ts = match *last {
                    Some(prev) if prev >= now => prev + chrono::Duration::microseconds(1),
                    _ => now,
                };
                *last = Some(ts);
                ts
            }
            Err(_) => now,
        }
    }

    fn build_note(&self, note: NewNote) -> Note {
        let ts = self.next_timestamp();
        Note {
            id: NoteId::new(Uuid::new_v4().to_string()),
            title: note.title,
            content: note.content,
            user_id: note.user_id,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn lock_poisoned() -> PersistError {
        PersistError::Internal("memory store lock poisoned".to_string())
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotesBackend for MemoryBackend {
    async fn select_notes(&self, owner: &str) -> Result<Vec<Note>> {
        self.enter(FailPoint::Select).await?;
        let caller = self.caller()?;
        if caller.id != owner {
            return Ok(Vec::new());
        }

        let notes = self.notes.read().map_err(|_| Self::lock_poisoned())?;
        let mut owned: Vec<Note> = notes.iter().filter(|n| n.user_id == owner).cloned().collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note> {
        self.enter(FailPoint::Insert).await?;
        let caller = self.caller()?;
        if caller.id != note.user_id {
            return Err(PersistError::Remote {
                status: 403,
                message: "new row violates row-level security policy".to_string(),
            });
        }

        let note = self.build_note(note);
        self.notes
            .write()
            .map_err(|_| Self::lock_poisoned())?
            .push(note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: &NoteId, patch: &NotePatch) -> Result<Note> {
        self.enter(FailPoint::Update).await?;
        let caller = self.caller()?;

        let mut notes = self.notes.write().map_err(|_| Self::lock_poisoned())?;
        let note = notes
            .iter_mut()
            .find(|n| n.id == *id && n.user_id == caller.id)
            .ok_or_else(|| PersistError::NotFound(id.to_string()))?;

        if patch.apply_to(note) {
            note.updated_at = Utc::now().max(note.updated_at);
        }
        Ok(note.clone())
    }

    async fn delete_note(&self, id: &NoteId) -> Result<()> {
        self.enter(FailPoint::Delete).await?;
        let caller = self.caller()?;

        self.notes
            .write()
            .map_err(|_| Self::lock_poisoned())?
            .retain(|n| !(n.id == *id && n.user_id == caller.id));
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session> {
        self.enter(FailPoint::SignIn).await?;
        let user = {
            let accounts = self.accounts.read().map_err(|_| Self::lock_poisoned())?;
            accounts
                .get(email)
                .filter(|a| a.password == password)
                .map(|a| a.user.clone())
                .ok_or_else(|| PersistError::Auth("Invalid login credentials".to_string()))?
        };

        let session = Self::session_for(user);
        self.session.set(session.clone());
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let exists = self
            .accounts
            .read()
            .map_err(|_| Self::lock_poisoned())?
            .contains_key(email);
        if exists {
            return Err(PersistError::Auth("User already registered".to_string()));
        }
        self.register(email, password);
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.session.clear();
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<User>> {
        Ok(self.session.user())
    }

    fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.session.subscribe()
    }
}
