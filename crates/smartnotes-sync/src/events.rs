use smartnotes_persist::NoteId;

use crate::mutation::MutationKey;

/// Notifications for whoever renders the workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A write was confirmed; the next read refetches
    NotesInvalidated,
    MutationFailed { key: MutationKey, message: String },
    SummaryReady { note_id: NoteId },
    SummaryFailed { note_id: NoteId, message: String },
    /// Session ended or changed user; all local state was dropped
    SessionReset,
}
