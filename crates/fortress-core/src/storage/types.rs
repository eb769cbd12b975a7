//! Core data types for the storage layer.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FortressError;

/// Title given to notes created without one.
pub const DEFAULT_NOTE_TITLE: &str = "Untitled Note";

/// Kind of note. Only `Secure` notes have encrypted content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteType {
    #[default]
    General,
    Secure,
    Todo,
    Reminder,
}

impl NoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteType::General => "general",
            NoteType::Secure => "secure",
            NoteType::Todo => "todo",
            NoteType::Reminder => "reminder",
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, NoteType::Secure)
    }
}

impl fmt::Display for NoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteType {
    type Err = FortressError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "general" => Ok(NoteType::General),
            "secure" => Ok(NoteType::Secure),
            "todo" => Ok(NoteType::Todo),
            "reminder" => Ok(NoteType::Reminder),
            other => Err(FortressError::InvalidInput(format!(
                "Unknown note type: {} (expected general, secure, todo, or reminder)",
                other
            ))),
        }
    }
}

/// A stored note.
///
/// For secure notes `content` holds the envelope exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier for this note
    pub id: Uuid,

    /// Owning account
    pub user_id: Uuid,

    /// Containing folder (`None` = inbox)
    pub folder_id: Option<Uuid>,

    pub title: Option<String>,

    pub content: Option<String>,

    #[serde(rename = "type")]
    pub note_type: NoteType,

    pub is_favorite: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Builder for creating new notes.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub user_id: Uuid,
    pub folder_id: Option<Uuid>,
    pub title: String,
    /// Content as it should be stored (already encrypted for secure notes)
    pub content: String,
    pub note_type: NoteType,
}

impl NewNote {
    pub fn new(user_id: Uuid, note_type: NoteType) -> Self {
        Self {
            user_id,
            folder_id: None,
            title: DEFAULT_NOTE_TITLE.to_string(),
            content: String::new(),
            note_type,
        }
    }

    pub fn in_folder(mut self, folder_id: Option<Uuid>) -> Self {
        self.folder_id = folder_id;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }
}

/// Partial update of a note. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    /// Content as it should be stored (already encrypted for secure notes)
    pub content: Option<String>,
    pub note_type: Option<NoteType>,
    /// `Some(None)` moves the note to the inbox
    pub folder_id: Option<Option<Uuid>>,
    pub is_favorite: Option<bool>,
}

impl NoteUpdate {
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

    pub fn note_type(mut self, note_type: NoteType) -> Self {
        self.note_type = Some(note_type);
        self
    }

    pub fn folder(mut self, folder_id: Option<Uuid>) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    pub fn favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = Some(is_favorite);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Which folder a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderScope {
    /// Notes in any folder, including the inbox
    #[default]
    Any,
    /// Notes without a folder
    Inbox,
    /// Notes in one folder
    Folder(Uuid),
}

/// Filter for querying notes. Results are newest `updated_at` first.
#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    pub user_id: Option<Uuid>,
    pub scope: FolderScope,
    pub note_type: Option<NoteType>,
    /// Case-insensitive substring of the title
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl NoteFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn inbox(mut self) -> Self {
        self.scope = FolderScope::Inbox;
        self
    }

    pub fn folder(mut self, folder_id: Uuid) -> Self {
        self.scope = FolderScope::Folder(folder_id);
        self
    }

    pub fn note_type(mut self, note_type: NoteType) -> Self {
        self.note_type = Some(note_type);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A folder in the nested folder tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Builder for creating new folders.
#[derive(Debug, Clone)]
pub struct NewFolder {
    pub user_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
}

impl NewFolder {
    pub fn new(user_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            user_id,
            parent_id: None,
            name: name.into(),
        }
    }

    pub fn with_parent(mut self, parent_id: Option<Uuid>) -> Self {
        self.parent_id = parent_id;
        self
    }
}
