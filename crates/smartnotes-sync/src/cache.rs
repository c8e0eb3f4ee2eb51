// Note list cache (in-memory, invalidate-on-write)

use std::future::Future;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use smartnotes_persist::Note;
use tokio::sync::Mutex;

use crate::error::SyncResult;

#[derive(Default)]
struct CacheInner {
    notes: Option<Arc<Vec<Note>>>,
    stale: bool,
    fetched_at: Option<DateTime<Utc>>,
    /// Bumped by every invalidation
    epoch: u64,
    /// Bumped when the cache is cleared (sign-out, user switch)
    generation: u64,
}

/// Identifies the cache state a fetch started from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FetchTicket {
    epoch: u64,
    generation: u64,
}

/// Mirror of the most recent successful fetch
///
/// Writes go through [`NoteCache::invalidate`] and the read-through path only.
/// Renderers use [`NoteCache::snapshot`], which never blocks on the network.
pub struct NoteCache {
    inner: RwLock<CacheInner>,
    refresh_gate: Mutex<()>,
}

impl NoteCache {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CacheInner {
                stale: true,
                ..CacheInner::default()
            }),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Last fetched list, possibly stale
    pub fn snapshot(&self) -> Option<Arc<Vec<Note>>> {
        self.inner.read().ok()?.notes.clone()
    }

    /// Whether the snapshot is authoritative
    pub fn is_fresh(&self) -> bool {
        self.inner
            .read()
            .map(|inner| inner.notes.is_some() && !inner.stale)
            .unwrap_or(false)
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().ok()?.fetched_at
    }

    /// Mark the snapshot stale; it stays readable until the next fetch lands
    pub fn invalidate(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.stale = true;
            inner.epoch += 1;
        }
        tracing::debug!("note cache invalidated");
    }

    /// Drop everything, including fetches still in flight
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            let generation = inner.generation + 1;
            *inner = CacheInner {
                stale: true,
                generation,
                ..CacheInner::default()
            };
        }
    }

    /// Put a just-created note at the head of the snapshot.
    /// The caller invalidates right after, so this never makes the cache fresh.
    pub(crate) fn prepend(&self, note: Note) {
        if let Ok(mut inner) = self.inner.write() {
            if let Some(notes) = inner.notes.as_mut() {
                if notes.iter().all(|n| n.id != note.id) {
                    Arc::make_mut(notes).insert(0, note);
                }
            }
        }
    }

    /// Return the snapshot when fresh, otherwise run `fetch` and store its result.
    ///
    /// Concurrent callers share one refresh. A failed fetch leaves the cache
    /// untouched. A fetch overtaken by an invalidation still stores its data
    /// but leaves the cache stale; one overtaken by `clear` is discarded.
    pub async fn read_through<F, Fut>(&self, fetch: F) -> SyncResult<Arc<Vec<Note>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SyncResult<Vec<Note>>>,
    {
        if let Some(notes) = self.fresh_snapshot() {
            return Ok(notes);
        }

        let _gate = self.refresh_gate.lock().await;
        if let Some(notes) = self.fresh_snapshot() {
            return Ok(notes);
        }

        let ticket = self.ticket();
        let notes = fetch().await?;
        Ok(self.complete(ticket, notes))
    }

    fn fresh_snapshot(&self) -> Option<Arc<Vec<Note>>> {
        let inner = self.inner.read().ok()?;
        if inner.stale {
            None
        } else {
            inner.notes.clone()
        }
    }

    fn ticket(&self) -> FetchTicket {
        self.inner
            .read()
            .map(|inner| FetchTicket {
                epoch: inner.epoch,
                generation: inner.generation,
            })
            .unwrap_or(FetchTicket {
                epoch: u64::MAX,
                generation: u64::MAX,
            })
    }

    fn complete(&self, ticket: FetchTicket, notes: Vec<Note>) -> Arc<Vec<Note>> {
        let notes = Arc::new(notes);
        let Ok(mut inner) = self.inner.write() else {
            return notes;
        };

        if inner.generation != ticket.generation {
            tracing::debug!("discarding fetch from a cleared session");
            return notes;
        }

        inner.notes = Some(notes.clone());
        inner.fetched_at = Some(Utc::now());
        inner.stale = inner.epoch != ticket.epoch;
        if inner.stale {
            tracing::debug!("fetch overtaken by invalidation, cache stays stale");
        }
        notes
    }
}

impl Default for NoteCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{SyncError, SyncResult};
    use smartnotes_persist::NoteId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    fn note(id: &str) -> Note {
        Note {
            id: NoteId::new(id),
            title: id.to_string(),
            content: String::new(),
            user_id: "u1".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn fetched(notes: Vec<Note>) -> SyncResult<Vec<Note>> {
        Ok(notes)
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_fetch() {
        let cache = NoteCache::new();
        let calls = AtomicUsize::new(0);
        let counter = &calls;
        let fetch = || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            fetched(vec![note("n1")])
        };

        cache.read_through(fetch).await.unwrap();
        let again = cache.read_through(fetch).await.unwrap();

        assert_eq!(again.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_fresh());
        assert!(cache.fetched_at().is_some());
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch_but_keeps_snapshot() {
        let cache = NoteCache::new();
        cache.read_through(|| async { fetched(vec![note("n1")]) }).await.unwrap();

        cache.invalidate();
        assert!(!cache.is_fresh());
        assert_eq!(cache.snapshot().unwrap().len(), 1);

        let notes = cache
            .read_through(|| async { fetched(vec![note("n1"), note("n2")]) })
            .await
            .unwrap();
        assert_eq!(notes.len(), 2);
        assert!(cache.is_fresh());
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_previous_list() {
        let cache = NoteCache::new();
        cache.read_through(|| async { fetched(vec![note("n1")]) }).await.unwrap();
        cache.invalidate();

        let err = cache
            .read_through(|| async { SyncResult::<Vec<Note>>::Err(SyncError::Remote("down".into())) })
            .await
            .unwrap_err();

        assert!(err.is_remote());
        assert_eq!(cache.snapshot().unwrap()[0].id, NoteId::new("n1"));
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_keeps_cache_stale() {
        let cache = NoteCache::new();
        let (tx, rx) = oneshot::channel::<()>();

        let fetch = cache.read_through(|| async move {
            rx.await.ok();
            fetched(vec![note("old")])
        });
        let poke = async {
            cache.invalidate();
            tx.send(()).ok();
        };
        let (result, ()) = tokio::join!(fetch, poke);

        assert_eq!(result.unwrap()[0].id, NoteId::new("old"));
        assert!(cache.snapshot().is_some());
        assert!(!cache.is_fresh());
    }

    #[tokio::test]
    async fn test_clear_during_fetch_discards_result() {
        let cache = NoteCache::new();
        let (tx, rx) = oneshot::channel::<()>();

        let fetch = cache.read_through(|| async move {
            rx.await.ok();
            fetched(vec![note("previous-user")])
        });
        let poke = async {
            cache.clear();
            tx.send(()).ok();
        };
        let _ = tokio::join!(fetch, poke);

        assert!(cache.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_prepend_only_touches_existing_snapshot() {
        let cache = NoteCache::new();
        cache.prepend(note("orphan"));
        assert!(cache.snapshot().is_none());

        cache.read_through(|| async { fetched(vec![note("n1")]) }).await.unwrap();
        cache.prepend(note("n2"));
        cache.prepend(note("n2"));

        let ids: Vec<String> = cache
            .snapshot()
            .unwrap()
            .iter()
            .map(|n| n.id.to_string())
            .collect();
        assert_eq!(ids, vec!["n2", "n1"]);
    }
}
