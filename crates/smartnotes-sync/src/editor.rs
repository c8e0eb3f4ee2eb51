// Open-note dialog state

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use smartnotes_persist::{Note, NoteDraft, NoteId};

/// Identity of one opening of the editor.
/// Completion handlers compare it before touching editor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditorTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenNote {
    pub ticket: EditorTicket,
    pub draft: NoteDraft,
}

/// At most one note is open at a time
pub struct Editor {
    open: RwLock<Option<OpenNote>>,
    next_ticket: AtomicU64,
}

impl Editor {
    pub fn new() -> Self {
        Self {
            open: RwLock::new(None),
            next_ticket: AtomicU64::new(1),
        }
    }

    /// Open an existing note, replacing whatever was open
    pub fn open(&self, note: &Note) -> EditorTicket {
        self.replace(NoteDraft::from(note))
    }

    /// Open an empty draft that will be saved by create
    pub fn open_new(&self) -> EditorTicket {
        self.replace(NoteDraft::default())
    }

    pub fn current(&self) -> Option<OpenNote> {
        self.open.read().ok()?.clone()
    }

    pub fn is_current(&self, ticket: EditorTicket) -> bool {
        self.open
            .read()
            .map(|open| open.as_ref().is_some_and(|o| o.ticket == ticket))
            .unwrap_or(false)
    }

    /// Update the draft text. Returns false if `ticket` was closed meanwhile.
    pub fn edit(
        &self,
        ticket: EditorTicket,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> bool {
        let Ok(mut open) = self.open.write() else {
            return false;
        };
        match open.as_mut() {
            Some(o) if o.ticket == ticket => {
                o.draft.title = title.into();
                o.draft.content = content.into();
                true
            }
            _ => false,
        }
    }

    pub fn close(&self) {
        if let Ok(mut open) = self.open.write() {
            *open = None;
        }
    }

    /// Close only if `ticket` is still the open one
    pub fn close_if(&self, ticket: EditorTicket) -> bool {
        let Ok(mut open) = self.open.write() else {
            return false;
        };
        if open.as_ref().is_some_and(|o| o.ticket == ticket) {
            *open = None;
            true
        } else {
            false
        }
    }

    /// Close if the open draft belongs to note `id`
    pub fn close_if_editing(&self, id: &NoteId) -> bool {
        let Ok(mut open) = self.open.write() else {
            return false;
        };
        if open
            .as_ref()
            .is_some_and(|o| o.draft.id.as_ref() == Some(id))
        {
            *open = None;
            true
        } else {
            false
        }
    }

    fn replace(&self, draft: NoteDraft) -> EditorTicket {
        let ticket = EditorTicket(self.next_ticket.fetch_add(1, Ordering::Relaxed));
        if let Ok(mut open) = self.open.write() {
            *open = Some(OpenNote { ticket, draft });
        }
        ticket
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
