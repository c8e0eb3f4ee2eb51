pub mod models;
pub mod trait_client;
pub mod session;
pub mod store;
pub mod dbs;
pub mod error;
pub mod builder;

pub use models::{
    relative_time, AuthState, NewNote, Note, NoteDraft, NoteId, NotePatch, Session, User,
    DEFAULT_NOTE_TITLE,
};
pub use trait_client::{AuthProvider, NotesBackend};
pub use session::SessionCell;
pub use store::NoteStoreClient;
pub use dbs::memory::{FailPoint, MemoryBackend};
pub use dbs::supabase::SupabaseClient;
pub use error::{PersistError, Result};
pub use builder::SupabaseClientBuilder;
