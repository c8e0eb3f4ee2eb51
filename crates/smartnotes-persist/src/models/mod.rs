mod note;
mod user;

pub use note::{relative_time, NewNote, Note, NoteDraft, NoteId, NotePatch, DEFAULT_NOTE_TITLE};
pub use user::{AuthState, Session, User};
