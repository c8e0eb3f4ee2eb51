//! Client-side synchronization layer for SmartNotes.
//!
//! Keeps a local view of the user's notes consistent with the remote store:
//!
//! - [`NoteCache`]: last successful fetch, invalidated after every confirmed write
//! - [`MutationCoordinator`]: create/update/delete with pending/success/failure status
//! - [`SummaryCoordinator`]: per-note summarization state, independent of editing
//! - [`Editor`]: the open-note dialog, guarded against late results
//! - [`NotesWorkspace`]: owns all of the above for one session

pub mod cache;
pub mod config;
pub mod editor;
pub mod error;
pub mod events;
pub mod mutation;
pub mod search;
pub mod summary;
pub mod workspace;

pub use cache::NoteCache;
pub use config::SyncConfig;
pub use editor::{Editor, EditorTicket, OpenNote};
pub use error::{SummarizeError, SyncError, SyncResult};
pub use events::SyncEvent;
pub use mutation::{normalize_draft, MutationCoordinator, MutationKey, MutationStatus};
pub use search::filter_notes;
pub use summary::{LlmSummarizer, Summarizer, SummaryCoordinator};
pub use workspace::NotesWorkspace;
