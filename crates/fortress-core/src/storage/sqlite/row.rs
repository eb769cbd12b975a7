//! Row types for database queries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{FortressError, Result};
use crate::storage::types::{Folder, Note, NoteType};

/// Column list matching [`NoteRow::from_row`].
pub const NOTE_COLUMNS: &str =
    "n.id, n.user_id, n.folder_id, n.title, n.content, n.note_type, n.is_favorite, n.created_at, n.updated_at";

/// Column list matching [`FolderRow::from_row`].
pub const FOLDER_COLUMNS: &str = "f.id, f.user_id, f.parent_id, f.name, f.created_at";

/// Raw row data from the notes table, before parsing into domain types.
#[derive(Debug)]
pub struct NoteRow {
    pub id: String,
    pub user_id: String,
    pub folder_id: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub note_type: String,
    pub is_favorite: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl NoteRow {
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            folder_id: row.get(2)?,
            title: row.get(3)?,
            content: row.get(4)?,
            note_type: row.get(5)?,
            is_favorite: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }
}

impl TryFrom<NoteRow> for Note {
    type Error = FortressError;

    fn try_from(row: NoteRow) -> Result<Self> {
        let id = parse_uuid(&row.id, "note")?;
        let user_id = parse_uuid(&row.user_id, "user")?;
        let folder_id = row
            .folder_id
            .as_deref()
            .map(|value| parse_uuid(value, "folder"))
            .transpose()?;
        let note_type: NoteType = row
            .note_type
            .parse()
            .map_err(|_| FortressError::Storage(format!("Invalid note type: {}", row.note_type)))?;

        Ok(Note {
            id,
            user_id,
            folder_id,
            title: row.title,
            content: row.content,
            note_type,
            is_favorite: row.is_favorite,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

/// Raw row data from the folders table.
#[derive(Debug)]
pub struct FolderRow {
    pub id: String,
    pub user_id: String,
    pub parent_id: Option<String>,
    pub name: String,
    pub created_at: String,
}

impl FolderRow {
    pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            parent_id: row.get(2)?,
            name: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl TryFrom<FolderRow> for Folder {
    type Error = FortressError;

    fn try_from(row: FolderRow) -> Result<Self> {
        Ok(Folder {
            id: parse_uuid(&row.id, "folder")?,
            user_id: parse_uuid(&row.user_id, "user")?,
            parent_id: row
                .parent_id
                .as_deref()
                .map(|value| parse_uuid(value, "parent folder"))
                .transpose()?,
            name: row.name,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

fn parse_uuid(value: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| FortressError::Storage(format!("Invalid {} UUID: {}", what, e)))
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .map_err(|e| FortressError::Storage(format!("Invalid timestamp: {}", e)))?
        .with_timezone(&Utc))
}
