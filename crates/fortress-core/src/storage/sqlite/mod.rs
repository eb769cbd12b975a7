//! SQLite storage backend.
//!
//! One connection guarded by a mutex, opened either on a file or in memory.
//! The schema is created on open if it is missing.

mod row;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::crypto::pin::PinVerifier;
use crate::error::{FortressError, Result};
use crate::storage::traits::{FolderStore, NoteStore, ProfileStore};
use crate::storage::types::{
    Folder, FolderScope, NewFolder, NewNote, Note, NoteFilter, NoteUpdate,
};

use row::{FolderRow, NoteRow, FOLDER_COLUMNS, NOTE_COLUMNS};

/// On-disk format version recorded in the `meta` table.
pub const FORMAT_VERSION: &str = "1";

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS profiles (
        user_id TEXT PRIMARY KEY,
        pin_hash TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS folders (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        parent_id TEXT,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,

        FOREIGN KEY (parent_id) REFERENCES folders(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS notes (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        folder_id TEXT,
        title TEXT,
        content TEXT,
        note_type TEXT NOT NULL DEFAULT 'general',
        is_favorite INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,

        FOREIGN KEY (folder_id) REFERENCES folders(id) ON DELETE SET NULL
    );

    CREATE INDEX IF NOT EXISTS notes_user_updated ON notes (user_id, updated_at);
    CREATE INDEX IF NOT EXISTS folders_user ON folders (user_id);
"#;

/// SQLite-backed note, folder, and profile store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a store file, creating parent directories as needed.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self::init(conn)?;
        tracing::debug!(path = %path.display(), "opened note store");
        Ok(store)
    }

    /// Open a throwaway store held in memory.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('format_version', ?)",
            [FORMAT_VERSION],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('created_at', ?)",
            [now()],
        )?;


        let version: String = conn.query_row(
            "SELECT value FROM meta WHERE key = 'format_version'",
            [],
            |row| row.get(0),
        )?;
        if version != FORMAT_VERSION {
            return Err(FortressError::Storage(format!(
                "Unsupported store format version {} (expected {})",
                version, FORMAT_VERSION
            )));
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| FortressError::Storage("SQLite connection poisoned".to_string()))
    }

    fn folder_exists(conn: &Connection, id: &Uuid) -> Result<bool> {
        let found: Option<String> = conn
            .query_row(
                "SELECT id FROM folders WHERE id = ?",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn query_note(conn: &Connection, id: &Uuid) -> Result<Option<Note>> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM notes n WHERE n.id = ?", NOTE_COLUMNS),
                [id.to_string()],
                NoteRow::from_row,
            )
            .optional()?;
        row.map(Note::try_from).transpose()
    }

    fn query_folder(conn: &Connection, id: &Uuid) -> Result<Option<Folder>> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM folders f WHERE f.id = ?", FOLDER_COLUMNS),
                [id.to_string()],
                FolderRow::from_row,
            )
            .optional()?;
        row.map(Folder::try_from).transpose()
    }
}

impl NoteStore for SqliteStore {
    fn insert_note(&self, note: &NewNote) -> Result<Note> {
        let conn = self.lock_conn()?;

        if let Some(folder_id) = note.folder_id {
            if !Self::folder_exists(&conn, &folder_id)? {
                return Err(FortressError::FolderNotFound(folder_id));
            }
        }

        let id = Uuid::new_v4();
        let timestamp = now();
        conn.execute(
            "INSERT INTO notes (id, user_id, folder_id, title, content, note_type, is_favorite, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)",
            rusqlite::params![
                id.to_string(),
                note.user_id.to_string(),
                note.folder_id.map(|folder| folder.to_string()),
                note.title,
                note.content,
                note.note_type.as_str(),
                timestamp,
                timestamp,
            ],
        )?;

        Self::query_note(&conn, &id)?.ok_or(FortressError::NoteNotFound(id))
    }

    fn get_note(&self, id: &Uuid) -> Result<Option<Note>> {
        let conn = self.lock_conn()?;
        Self::query_note(&conn, id)
    }

    fn update_note(&self, id: &Uuid, update: &NoteUpdate) -> Result<()> {
        let conn = self.lock_conn()?;

        let mut assignments: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref title) = update.title {
            assignments.push("title = ?");
            params.push(Box::new(title.clone()));
        }
        if let Some(ref content) = update.content {
            assignments.push("content = ?");
            params.push(Box::new(content.clone()));
        }
        if let Some(note_type) = update.note_type {
            assignments.push("note_type = ?");
            params.push(Box::new(note_type.as_str()));
        }
        if let Some(folder_id) = update.folder_id {
            if let Some(folder_id) = folder_id {
                if !Self::folder_exists(&conn, &folder_id)? {
                    return Err(FortressError::FolderNotFound(folder_id));
                }
            }
            assignments.push("folder_id = ?");
            params.push(Box::new(folder_id.map(|folder| folder.to_string())));
        }
        if let Some(is_favorite) = update.is_favorite {
            assignments.push("is_favorite = ?");
            params.push(Box::new(is_favorite));
        }

        assignments.push("updated_at = ?");
        params.push(Box::new(now()));
        params.push(Box::new(id.to_string()));

        let query = format!("UPDATE notes SET {} WHERE id = ?", assignments.join(", "));
        let changed = conn.execute(&query, rusqlite::params_from_iter(params.iter()))?;
        if changed == 0 {
            return Err(FortressError::NoteNotFound(*id));
        }
        Ok(())
    }

    fn delete_note(&self, id: &Uuid) -> Result<()> {
        let conn = self.lock_conn()?;
        let changed = conn.execute("DELETE FROM notes WHERE id = ?", [id.to_string()])?;
        if changed == 0 {
            return Err(FortressError::NoteNotFound(*id));
        }
        Ok(())
    }

    fn list_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>> {
        let conn = self.lock_conn()?;

        let mut conditions: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(user_id) = filter.user_id {
            conditions.push("n.user_id = ?".to_string());
            params.push(Box::new(user_id.to_string()));
        }

        match filter.scope {
            FolderScope::Any => {}
            FolderScope::Inbox => conditions.push("n.folder_id IS NULL".to_string()),
            FolderScope::Folder(folder_id) => {
                conditions.push("n.folder_id = ?".to_string());
                params.push(Box::new(folder_id.to_string()));
            }
        }

        if let Some(note_type) = filter.note_type {
            conditions.push("n.note_type = ?".to_string());
            params.push(Box::new(note_type.as_str()));
        }

        if let Some(ref search) = filter.search {
            conditions.push("n.title LIKE ? ESCAPE '\\'".to_string());
            params.push(Box::new(format!("%{}%", escape_like(search))));
        }

        let mut query = format!("SELECT {} FROM notes n", NOTE_COLUMNS);
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY n.updated_at DESC, n.rowid DESC");

        if let Some(limit) = filter.limit {
            query.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = conn.prepare(&query)?;
        let rows = stmt.query_map(
            rusqlite::params_from_iter(params.iter()),
            NoteRow::from_row,
        )?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(Note::try_from(row?)?);
        }
        Ok(notes)
    }
}

impl FolderStore for SqliteStore {
    fn insert_folder(&self, folder: &NewFolder) -> Result<Folder> {
        let conn = self.lock_conn()?;

        if let Some(parent_id) = folder.parent_id {
            if !Self::folder_exists(&conn, &parent_id)? {
                return Err(FortressError::FolderNotFound(parent_id));
            }
        }

        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO folders (id, user_id, parent_id, name, created_at) VALUES (?, ?, ?, ?, ?)",
            rusqlite::params![
                id.to_string(),
                folder.user_id.to_string(),
                folder.parent_id.map(|parent| parent.to_string()),
                folder.name,
                now(),
            ],
        )?;

        Self::query_folder(&conn, &id)?.ok_or(FortressError::FolderNotFound(id))
    }

    fn get_folder(&self, id: &Uuid) -> Result<Option<Folder>> {
        let conn = self.lock_conn()?;
        Self::query_folder(&conn, id)
    }

    fn list_folders(&self, user_id: &Uuid) -> Result<Vec<Folder>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM folders f WHERE f.user_id = ? ORDER BY f.name COLLATE NOCASE, f.created_at",
            FOLDER_COLUMNS
        ))?;
        let rows = stmt.query_map([user_id.to_string()], FolderRow::from_row)?;

        let mut folders = Vec::new();
        for row in rows {
            folders.push(Folder::try_from(row?)?);
        }
        Ok(folders)
    }

    fn rename_folder(&self, id: &Uuid, name: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        let changed = conn.execute(
            "UPDATE folders SET name = ? WHERE id = ?",
            [name.to_string(), id.to_string()],
        )?;
        if changed == 0 {
            return Err(FortressError::FolderNotFound(*id));
        }
        Ok(())
    }

    fn delete_folder(&self, id: &Uuid) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;

        // Foreign keys cascade to subfolders and null out folder_id on notes.
        let changed = tx.execute("DELETE FROM folders WHERE id = ?", [id.to_string()])?;
        if changed == 0 {
            return Err(FortressError::FolderNotFound(*id));
        }

        tx.commit()?;
        Ok(())
    }
}

impl ProfileStore for SqliteStore {
    fn pin_verifier(&self, user_id: &Uuid) -> Result<Option<PinVerifier>> {
        let conn = self.lock_conn()?;
        let hash: Option<String> = conn
            .query_row(
                "SELECT pin_hash FROM profiles WHERE user_id = ?",
                [user_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash.map(PinVerifier::from_phc))
    }

    fn store_pin_verifier(&self, user_id: &Uuid, verifier: &PinVerifier) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO profiles (user_id, pin_hash, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET pin_hash = excluded.pin_hash, updated_at = excluded.updated_at",
            [user_id.to_string(), verifier.as_str().to_string(), now()],
        )?;
        Ok(())
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Current time in a fixed-width RFC 3339 form, so text order is time order.
fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
