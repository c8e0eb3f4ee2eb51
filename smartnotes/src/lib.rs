//! # SmartNotes - note-taking client core
//!
//! SmartNotes keeps a user's notes in a hosted Supabase project and can ask an
//! OpenAI-compatible model (Groq by default) for bullet-point summaries:
//! - **Read-through cache** refetched after every confirmed write
//! - **Mutation tracking** with pending/success/failure status per note
//! - **Independent summaries** keyed by note id, never blocking edits
//! - **Async/await** on Tokio, shareable behind an `Arc`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use smartnotes::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::load()?;
//!     init_logging(&config.logging)?;
//!
//!     let workspace = WorkspaceBuilder::from_config(&config).build()?;
//!     workspace.sign_in("ada@example.com", "secret").await?;
//!
//!     let note = workspace.create_note("Groceries", "milk, eggs, bread").await?;
//!     let summary = workspace.summarize_note(&note).await?;
//!     println!("{}", summary);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **smartnotes-llm**: chat-completion client (OpenAI-compatible, Groq default)
//! - **smartnotes-persist**: note models, Supabase auth and PostgREST access
//! - **smartnotes-sync**: cache, mutation and summary coordinators
//!
//! ## Offline use
//!
//! [`MemoryBackend`](prelude::MemoryBackend) implements both backend contracts
//! in process, which is handy for demos and tests:
//!
//! ```rust,no_run
//! use smartnotes::prelude::*;
//!
//! # fn demo(summarizer: std::sync::Arc<dyn Summarizer>) -> anyhow::Result<()> {
//! let workspace = WorkspaceBuilder::new()
//!     .backend(MemoryBackend::signed_in("ada@example.com"))
//!     .summarizer(summarizer)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod logging;

pub use builder::WorkspaceBuilder;
pub use config::{AppConfig, LlmConfig, LogFormat, LoggingConfig, SupabaseConfig};
pub use logging::init_logging;

// Re-export the member crates
pub use smartnotes_llm as llm;
pub use smartnotes_persist as persist;
pub use smartnotes_sync as sync;

/// Prelude module for convenient imports
///
/// ```rust
/// use smartnotes::prelude::*;
/// ```
pub mod prelude {
    pub use crate::builder::WorkspaceBuilder;
    pub use crate::config::AppConfig;
    pub use crate::logging::init_logging;

    pub use smartnotes_llm::{ChatClient, ChatOptions, ChatRequest, ChatResponse, Message};
    pub use smartnotes_persist::{
        relative_time, AuthState, MemoryBackend, Note, NoteDraft, NoteId, NotePatch, User,
    };
    pub use smartnotes_sync::{
        EditorTicket, MutationKey, MutationStatus, NotesWorkspace, SummarizeError, Summarizer,
        SyncConfig, SyncError, SyncEvent,
    };

    pub use anyhow::Result;
}
