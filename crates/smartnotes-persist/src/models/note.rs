use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Title shown and stored for notes saved without one
pub const DEFAULT_NOTE_TITLE: &str = "Untitled Note";

/// Store-assigned note identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NoteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for NoteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A persisted note as returned by the remote store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub content: String,
    /// Owner; set by the store from the creating session
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_NOTE_TITLE
        } else {
            &self.title
        }
    }

    pub fn display_content(&self) -> &str {
        if self.content.trim().is_empty() {
            "No content"
        } else {
            &self.content
        }
    }

    /// Case-insensitive match against title or content.
    /// `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.content.to_lowercase().contains(needle)
    }
}

/// Insert payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub user_id: String,
}

/// Partial update. Absent fields are not sent and stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl NotePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// Apply to a note in place, returning whether anything changed
    pub fn apply_to(&self, note: &mut Note) -> bool {
        let mut changed = false;
        if let Some(title) = &self.title {
            changed |= note.title != *title;
            note.title = title.clone();
        }
        if let Some(content) = &self.content {
            changed |= note.content != *content;
            note.content = content.clone();
        }
        changed
    }
}

/// Editor contents. `id == None` means the note has not been persisted yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub id: Option<NoteId>,
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

impl From<&Note> for NoteDraft {
    fn from(note: &Note) -> Self {
        Self {
            id: Some(note.id.clone()),
            title: note.title.clone(),
            content: note.content.clone(),
        }
    }
}

/// Human-readable distance between `at` and `now`, e.g. "5 minutes ago"
pub fn relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(at);
    let future = delta.num_seconds() < 0;
    let seconds = delta.num_seconds().unsigned_abs();

    let rounded = |value: u64, unit: u64| (value + unit / 2) / unit;
    let minutes = rounded(seconds, 60);
    let hours = rounded(seconds, 3600);
    let days = rounded(seconds, 86_400);

    let distance = if seconds < 45 {
        "less than a minute".to_string()
    } else if minutes <= 1 {
        "1 minute".to_string()
    } else if minutes < 45 {
        format!("{} minutes", minutes)
    } else if minutes < 90 {
        "about 1 hour".to_string()
    } else if hours < 24 {
        format!("about {} hours", hours)
    } else if hours < 42 {
        "1 day".to_string()
    } else if days < 30 {
        format!("{} days", days)
    } else if days < 45 {
        "about 1 month".to_string()
    } else if days < 365 {
        format!("{} months", rounded(days, 30))
    } else {
        let years = rounded(days, 365);
        if years <= 1 {
            "about 1 year".to_string()
        } else {
            format!("about {} years", years)
        }
    };

    if future {
        format!("in {}", distance)
    } else {
        format!("{} ago", distance)
    }
}

// PostgREST sends `null` for empty text columns
fn nullable_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
