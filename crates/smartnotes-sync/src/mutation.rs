// Create/update/delete sequencing with cache invalidation

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use smartnotes_persist::{
    Note, NoteDraft, NoteId, NotePatch, NoteStoreClient, PersistError, DEFAULT_NOTE_TITLE,
};
use tokio::sync::broadcast;

use crate::cache::NoteCache;
use crate::error::{bounded, SyncResult};
use crate::events::SyncEvent;

/// What a mutation acts on. Mutations on different keys are independent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MutationKey {
    Create,
    Update(NoteId),
    Delete(NoteId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

impl MutationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, MutationStatus::Pending)
    }
}

#[derive(Default)]
struct Slot {
    in_flight: usize,
    last: MutationStatus,
}

/// Trim both fields and fall back to the default title
pub fn normalize_draft(draft: &NoteDraft) -> NoteDraft {
    let title = draft.title.trim();
    NoteDraft {
        id: draft.id.clone(),
        title: if title.is_empty() {
            DEFAULT_NOTE_TITLE.to_string()
        } else {
            title.to_string()
        },
        content: draft.content.trim().to_string(),
    }
}

/// Mutation Coordinator
///
/// Every write is a single attempt bounded by the request timeout. The cache
/// is invalidated only after the store confirms, and left alone on failure.
pub struct MutationCoordinator {
    store: NoteStoreClient,
    cache: Arc<NoteCache>,
    events: broadcast::Sender<SyncEvent>,
    slots: Mutex<HashMap<MutationKey, Slot>>,
    timeout: Duration,
}

impl MutationCoordinator {
    pub fn new(
        store: NoteStoreClient,
        cache: Arc<NoteCache>,
        events: broadcast::Sender<SyncEvent>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            events,
            slots: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    /// Create a note with normalized title and content
    pub async fn create(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> SyncResult<Note> {
        let draft = normalize_draft(&NoteDraft::new(title, content));
        let store = self.store.clone();
        let cache = self.cache.clone();

        self.run(
            MutationKey::Create,
            async move { store.create_note(draft.title, draft.content).await },
            move |note: &Note| cache.prepend(note.clone()),
        )
        .await
    }

    /// Persist an editor draft: create when it has no id, otherwise update
    /// both fields
    pub async fn save(&self, draft: &NoteDraft) -> SyncResult<Note> {
        match &draft.id {
            None => self.create(draft.title.as_str(), draft.content.as_str()).await,
            Some(id) => {
                let normalized = normalize_draft(draft);
                let patch = NotePatch::new()
                    .title(normalized.title)
                    .content(normalized.content);
                self.patch(id, patch).await
            }
        }
    }

    /// Raw partial update; fields are sent as given
    pub async fn patch(&self, id: &NoteId, patch: NotePatch) -> SyncResult<Note> {
        let store = self.store.clone();
        let target = id.clone();

        self.run(
            MutationKey::Update(id.clone()),
            async move { store.update_note(&target, &patch).await },
            |_: &Note| {},
        )
        .await
    }

    pub async fn delete(&self, id: &NoteId) -> SyncResult<()> {
        let store = self.store.clone();
        let target = id.clone();

        self.run(
            MutationKey::Delete(id.clone()),
            async move { store.delete_note(&target).await },
            |_: &()| {},
        )
        .await
    }

    /// Pending while any call for `key` is in flight, else the last outcome
    pub fn status(&self, key: &MutationKey) -> MutationStatus {
        let Ok(slots) = self.slots.lock() else {
            return MutationStatus::Idle;
        };
        match slots.get(key) {
            Some(slot) if slot.in_flight > 0 => MutationStatus::Pending,
            Some(slot) => slot.last.clone(),
            None => MutationStatus::Idle,
        }
    }

    pub fn is_pending(&self, key: &MutationKey) -> bool {
        self.status(key).is_pending()
    }

    /// Forget every recorded outcome; in-flight calls keep their counters
    pub fn reset(&self) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.retain(|_, slot| {
                slot.last = MutationStatus::Idle;
                slot.in_flight > 0
            });
        }
    }

    async fn run<T, F, H>(&self, key: MutationKey, call: F, on_success: H) -> SyncResult<T>
    where
        F: Future<Output = Result<T, PersistError>>,
        H: FnOnce(&T),
    {
        let _in_flight = InFlight::enter(&self.slots, key.clone());
        tracing::debug!(?key, "mutation started");

        let result = bounded(self.timeout, call).await;
        match &result {
            Ok(value) => {
                on_success(value);
                self.cache.invalidate();
                self.record(&key, MutationStatus::Succeeded);
                let _ = self.events.send(SyncEvent::NotesInvalidated);
                tracing::debug!(?key, "mutation confirmed");
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(?key, error = %message, "mutation failed");
                self.record(&key, MutationStatus::Failed(message.clone()));
                let _ = self.events.send(SyncEvent::MutationFailed { key, message });
            }
        }
        result
    }

    fn record(&self, key: &MutationKey, status: MutationStatus) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.entry(key.clone()).or_default().last = status;
        }
    }
}

/// Keeps a key pending for as long as the call future is alive
struct InFlight<'a> {
    slots: &'a Mutex<HashMap<MutationKey, Slot>>,
    key: MutationKey,
}

impl<'a> InFlight<'a> {
    fn enter(slots: &'a Mutex<HashMap<MutationKey, Slot>>, key: MutationKey) -> Self {
        if let Ok(mut guard) = slots.lock() {
            guard.entry(key.clone()).or_default().in_flight += 1;
        }
        Self { slots, key }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.slots.lock() {
            if let Some(slot) = guard.get_mut(&self.key) {
                slot.in_flight = slot.in_flight.saturating_sub(1);
            }
        }
    }
}
