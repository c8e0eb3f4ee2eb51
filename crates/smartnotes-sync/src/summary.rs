// Per-note summarization state

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use smartnotes_llm::{ChatClient, ChatOptions, ChatRequest, Message};
use smartnotes_persist::NoteId;
use tokio::sync::broadcast;

use crate::error::SummarizeError;
use crate::events::SyncEvent;

/// Turns note content into a summary. One attempt per call.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, content: &str) -> Result<String, SummarizeError>;
}

const SYSTEM_PROMPT: &str =
    "You are an assistant that summarizes user notes into concise bullet points.";
const USER_PROMPT_PREFIX: &str = "Summarize the following note in markdown format:: ";

/// [`Summarizer`] backed by a chat-completion model
pub struct LlmSummarizer {
    client: Arc<dyn ChatClient>,
    model: String,
    options: ChatOptions,
}

impl LlmSummarizer {
    pub const DEFAULT_MODEL: &'static str = "llama3-8b-8192";
    /// Returned when the model answers without usable content
    pub const FALLBACK: &'static str = "No summary available.";

    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self {
            client,
            model: Self::DEFAULT_MODEL.to_string(),
            options: ChatOptions::new().temperature(0.7).max_tokens(300),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn request(&self, content: &str) -> ChatRequest {
        ChatRequest::new(
            self.model.clone(),
            vec![
                Message::system(SYSTEM_PROMPT),
                Message::human(format!("{USER_PROMPT_PREFIX}{content}")),
            ],
        )
        .with_options(self.options.clone())
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, content: &str) -> Result<String, SummarizeError> {
        let response = self
            .client
            .chat(self.request(content))
            .await
            .map_err(|e| SummarizeError::Request(format!("{e:#}")))?;

        Ok(response
            .text()
            .map(str::to_string)
            .unwrap_or_else(|| Self::FALLBACK.to_string()))
    }
}

#[derive(Default)]
struct SummarySlot {
    text: Option<String>,
    in_flight: usize,
    /// Requests started under an older epoch are discarded on arrival
    epoch: u64,
}

/// Summarization Coordinator
///
/// Keeps one summary and one busy counter per note id. Requests for the same
/// id may overlap; whichever resolves last owns the slot.
pub struct SummaryCoordinator {
    summarizer: Arc<dyn Summarizer>,
    slots: Mutex<HashMap<NoteId, SummarySlot>>,
    epochs: AtomicU64,
    events: broadcast::Sender<SyncEvent>,
    timeout: Duration,
}

impl SummaryCoordinator {
    pub fn new(
        summarizer: Arc<dyn Summarizer>,
        events: broadcast::Sender<SyncEvent>,
        timeout: Duration,
    ) -> Self {
        Self {
            summarizer,
            slots: Mutex::new(HashMap::new()),
            epochs: AtomicU64::new(1),
            events,
            timeout,
        }
    }

    /// Summarize `content` and store the result under `note_id`.
    ///
    /// On failure nothing is stored and the previous summary stays visible.
    pub async fn summarize(
        &self,
        note_id: &NoteId,
        content: &str,
    ) -> Result<String, SummarizeError> {
        let guard = Busy::enter(self, note_id);
        tracing::debug!(%note_id, "summary requested");

        let outcome = match tokio::time::timeout(self.timeout, self.summarizer.summarize(content))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SummarizeError::Timeout(self.timeout)),
        };

        let stored = match &outcome {
            Ok(text) => self.store(note_id, guard.epoch, text),
            Err(_) => false,
        };
        drop(guard);

        match &outcome {
            Ok(_) if stored => {
                let _ = self.events.send(SyncEvent::SummaryReady {
                    note_id: note_id.clone(),
                });
            }
            Ok(_) => tracing::debug!(%note_id, "discarding summary for forgotten note"),
            Err(err) => {
                tracing::warn!(%note_id, error = %err, "summarization failed");
                let _ = self.events.send(SyncEvent::SummaryFailed {
                    note_id: note_id.clone(),
                    message: err.to_string(),
                });
            }
        }
        outcome
    }

    pub fn summary(&self, note_id: &NoteId) -> Option<String> {
        self.slots.lock().ok()?.get(note_id)?.text.clone()
    }

    pub fn is_busy(&self, note_id: &NoteId) -> bool {
        self.slots
            .lock()
            .map(|slots| slots.get(note_id).is_some_and(|s| s.in_flight > 0))
            .unwrap_or(false)
    }

    /// Drop the summary for a deleted note, including results still in flight
    pub fn forget(&self, note_id: &NoteId) {
        let epoch = self.next_epoch();
        if let Ok(mut slots) = self.slots.lock() {
            match slots.get(note_id) {
                Some(slot) if slot.in_flight > 0 => {
                    // Retained only to fence off the pending results
                    if let Some(slot) = slots.get_mut(note_id) {
                        slot.text = None;
                        slot.epoch = epoch;
                    }
                }
                Some(_) => {
                    slots.remove(note_id);
                }
                None => {}
            }
        }
    }

    /// Forget every note
    pub fn clear(&self) {
        let epoch = self.next_epoch();
        if let Ok(mut slots) = self.slots.lock() {
            slots.retain(|_, slot| {
                slot.text = None;
                slot.epoch = epoch;
                slot.in_flight > 0
            });
        }
    }

    fn next_epoch(&self) -> u64 {
        self.epochs.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn store(&self, note_id: &NoteId, epoch: u64, text: &str) -> bool {
        let Ok(mut slots) = self.slots.lock() else {
            return false;
        };
        match slots.get_mut(note_id) {
            Some(slot) if slot.epoch == epoch => {
                slot.text = Some(text.to_string());
                true
            }
            _ => false,
        }
    }
}

/// Counts one in-flight request for a note until dropped
struct Busy<'a> {
    coordinator: &'a SummaryCoordinator,
    note_id: NoteId,
    epoch: u64,
}

impl<'a> Busy<'a> {
    fn enter(coordinator: &'a SummaryCoordinator, note_id: &NoteId) -> Self {
        let epoch = match coordinator.slots.lock() {
            Ok(mut slots) => {
                let slot = slots.entry(note_id.clone()).or_default();
                slot.in_flight += 1;
                slot.epoch
            }
            Err(_) => u64::MAX,
        };
        Self {
            coordinator,
            note_id: note_id.clone(),
            epoch,
        }
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        if let Ok(mut slots) = self.coordinator.slots.lock() {
            if let Some(slot) = slots.get_mut(&self.note_id) {
                slot.in_flight = slot.in_flight.saturating_sub(1);
                if slot.in_flight == 0 && slot.text.is_none() {
                    slots.remove(&self.note_id);
                }
            }
        }
    }
}
