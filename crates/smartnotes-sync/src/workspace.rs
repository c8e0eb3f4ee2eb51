use std::sync::{Arc, RwLock};

use smartnotes_persist::{AuthState, Note, NoteId, NotePatch, NoteStoreClient, User};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::cache::NoteCache;
use crate::config::SyncConfig;
use crate::editor::{Editor, EditorTicket, OpenNote};
use crate::error::{bounded, SummarizeError, SyncError, SyncResult};
use crate::events::SyncEvent;
use crate::mutation::{MutationCoordinator, MutationKey, MutationStatus};
use crate::search::filter_notes;
use crate::summary::{Summarizer, SummaryCoordinator};

/// One signed-in session's worth of client state
///
/// Owns the note cache, both coordinators and the editor. Share it behind an
/// `Arc`; every method takes `&self`.
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use smartnotes_persist::{MemoryBackend, NoteStoreClient};
/// # use smartnotes_sync::{NotesWorkspace, Summarizer, SyncConfig};
/// # async fn demo(summarizer: Arc<dyn Summarizer>) -> anyhow::Result<()> {
/// let backend = MemoryBackend::signed_in("ada@example.com");
/// let store = NoteStoreClient::new(backend.clone(), backend);
/// let workspace = NotesWorkspace::new(store, summarizer, SyncConfig::default());
///
/// workspace.create_note("Groceries", "milk, eggs").await?;
/// for note in workspace.notes().await?.iter() {
///     println!("{}", note.display_title());
/// }
/// # Ok(())
/// # }
/// ```
pub struct NotesWorkspace {
    store: NoteStoreClient,
    cache: Arc<NoteCache>,
    mutations: MutationCoordinator,
    summaries: SummaryCoordinator,
    editor: Editor,
    events: broadcast::Sender<SyncEvent>,
    config: SyncConfig,
    active_user: RwLock<Option<String>>,
}

impl NotesWorkspace {
    pub fn new(store: NoteStoreClient, summarizer: Arc<dyn Summarizer>, config: SyncConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let cache = Arc::new(NoteCache::new());

        let mutations = MutationCoordinator::new(
            store.clone(),
            cache.clone(),
            events.clone(),
            config.request_timeout(),
        );
        let summaries =
            SummaryCoordinator::new(summarizer, events.clone(), config.summary_timeout());
        let active_user = store.auth().subscribe().borrow().user().map(|u| u.id.clone());

        Self {
            store,
            cache,
            mutations,
            summaries,
            editor: Editor::new(),
            events,
            config,
            active_user: RwLock::new(active_user),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    // Reads

    /// The user's notes, newest first. Served from the cache while it is fresh.
    pub async fn notes(&self) -> SyncResult<Arc<Vec<Note>>> {
        let timeout = self.config.request_timeout();
        self.cache
            .read_through(|| bounded(timeout, self.store.list_notes()))
            .await
    }

    /// Last fetched list without touching the network
    pub fn cached_notes(&self) -> Option<Arc<Vec<Note>>> {
        self.cache.snapshot()
    }

    pub fn cache(&self) -> &NoteCache {
        &self.cache
    }

    pub async fn search(&self, query: &str) -> SyncResult<Vec<Note>> {
        let notes = self.notes().await?;
        Ok(filter_notes(&notes, query))
    }

    // Editor

    pub fn open_note(&self, note: &Note) -> EditorTicket {
        self.editor.open(note)
    }

    pub fn open_new_note(&self) -> EditorTicket {
        self.editor.open_new()
    }

    pub fn edit_open_note(
        &self,
        ticket: EditorTicket,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> bool {
        self.editor.edit(ticket, title, content)
    }

    pub fn open_draft(&self) -> Option<OpenNote> {
        self.editor.current()
    }

    pub fn close_editor(&self) {
        self.editor.close();
    }

    // Writes

    pub async fn create_note(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> SyncResult<Note> {
        self.mutations.create(title, content).await
    }

    /// Save whatever is open in the editor.
    ///
    /// The editor closes on success, unless it was reopened while the save
    /// was in flight. On failure the draft stays open.
    pub async fn save_open_note(&self) -> SyncResult<Note> {
        let open = self.editor.current().ok_or(SyncError::NoOpenNote)?;
        let note = self.mutations.save(&open.draft).await?;
        self.editor.close_if(open.ticket);
        Ok(note)
    }

    pub async fn update_note(&self, id: &NoteId, patch: NotePatch) -> SyncResult<Note> {
        self.mutations.patch(id, patch).await
    }

    /// Delete a note. If it is open in the editor the editor closes right away;
    /// its summary is dropped once the store confirms.
    pub async fn delete_note(&self, id: &NoteId) -> SyncResult<()> {
        self.editor.close_if_editing(id);
        self.mutations.delete(id).await?;
        self.summaries.forget(id);
        Ok(())
    }

    pub fn mutation_status(&self, key: &MutationKey) -> MutationStatus {
        self.mutations.status(key)
    }

    // Summaries

    pub async fn summarize(&self, note_id: &NoteId, content: &str) -> Result<String, SummarizeError> {
        self.summaries.summarize(note_id, content).await
    }

    pub async fn summarize_note(&self, note: &Note) -> Result<String, SummarizeError> {
        self.summarize(&note.id, &note.content).await
    }

    pub fn summary(&self, note_id: &NoteId) -> Option<String> {
        self.summaries.summary(note_id)
    }

    pub fn is_summarizing(&self, note_id: &NoteId) -> bool {
        self.summaries.is_busy(note_id)
    }

    // Session

    pub async fn sign_in(&self, email: &str, password: &str) -> SyncResult<User> {
        let session = bounded(
            self.config.request_timeout(),
            self.store.auth().sign_in_with_password(email, password),
        )
        .await?;
        tracing::info!(user_id = %session.user.id, "signed in");

        self.observe_user(Some(&session.user));
        Ok(session.user)
    }

    /// Register an account; does not sign in
    pub async fn sign_up(&self, email: &str, password: &str) -> SyncResult<()> {
        bounded(
            self.config.request_timeout(),
            self.store.auth().sign_up(email, password),
        )
        .await
    }

    /// End the session and drop every piece of local state
    pub async fn sign_out(&self) -> SyncResult<()> {
        let result = bounded(self.config.request_timeout(), self.store.auth().sign_out()).await;
        tracing::info!("signed out");
        if let Ok(mut active) = self.active_user.write() {
            *active = None;
        }
        self.reset();
        result
    }

    pub async fn current_user(&self) -> SyncResult<Option<User>> {
        let user = bounded(self.config.request_timeout(), self.store.auth().current_user()).await?;
        self.observe_user(user.as_ref());
        Ok(user)
    }

    pub fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.store.auth().subscribe()
    }

    /// Drop cache, summaries, mutation outcomes and the open draft
    pub fn reset(&self) {
        self.cache.clear();
        self.summaries.clear();
        self.mutations.reset();
        self.editor.close();
        let _ = self.events.send(SyncEvent::SessionReset);
        tracing::debug!("workspace reset");
    }

    /// Follow auth-state changes made outside this workspace, e.g. a rejected
    /// token. The task ends when the workspace is dropped.
    pub fn spawn_auth_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let mut states = self.auth_state();
        let workspace = Arc::downgrade(self);

        tokio::spawn(async move {
            while states.changed().await.is_ok() {
                let state = states.borrow_and_update().clone();
                let Some(workspace) = workspace.upgrade() else {
                    break;
                };
                workspace.observe_user(state.user());
            }
        })
    }

    // Resets when the active user goes away or changes
    fn observe_user(&self, user: Option<&User>) {
        let next = user.map(|u| u.id.clone());
        let previous = {
            let Ok(mut active) = self.active_user.write() else {
                return;
            };
            if *active == next {
                return;
            }
            std::mem::replace(&mut *active, next)
        };

        if previous.is_some() {
            tracing::info!(previous = ?previous, "session changed, resetting workspace");
            self.reset();
        }
    }
}
