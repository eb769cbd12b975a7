//! Storage trait definitions.
//!
//! The traits are object-safe so services can hold `&dyn` references and
//! tests can substitute small in-memory stores.

use uuid::Uuid;

use super::types::{Folder, NewFolder, NewNote, Note, NoteFilter, NoteUpdate};
use crate::crypto::pin::PinVerifier;
use crate::error::Result;

/// Row store for notes.
///
/// Implementations store `content` verbatim and never transform it.
pub trait NoteStore: Send + Sync {
    /// Insert a new note and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns `FortressError::FolderNotFound` if `folder_id` does not exist.
    fn insert_note(&self, note: &NewNote) -> Result<Note>;

    /// Get a note by ID.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(note))` if found, `Ok(None)` if not found.
    fn get_note(&self, id: &Uuid) -> Result<Option<Note>>;

    /// Apply a partial update and bump `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `FortressError::NoteNotFound` if the note does not exist.
    fn update_note(&self, id: &Uuid, update: &NoteUpdate) -> Result<()>;

    /// Delete a note.
    ///
    /// # Errors
    ///
    /// Returns `FortressError::NoteNotFound` if the note does not exist.
    fn delete_note(&self, id: &Uuid) -> Result<()>;

    /// List notes matching the filter, most recently updated first.
    fn list_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>>;
}

/// Row store for the folder tree.
pub trait FolderStore: Send + Sync {
    fn insert_folder(&self, folder: &NewFolder) -> Result<Folder>;

    fn get_folder(&self, id: &Uuid) -> Result<Option<Folder>>;

    /// List a user's folders ordered by name.
    fn list_folders(&self, user_id: &Uuid) -> Result<Vec<Folder>>;

    fn rename_folder(&self, id: &Uuid, name: &str) -> Result<()>;

    /// Delete a folder and its subfolders. Notes inside move to the inbox.
    fn delete_folder(&self, id: &Uuid) -> Result<()>;
}

/// Per-account vault profile storage.
pub trait ProfileStore: Send + Sync {
    /// The stored PIN verifier, or `None` if the account never set a PIN.
    fn pin_verifier(&self, user_id: &Uuid) -> Result<Option<PinVerifier>>;

    /// Insert or replace the PIN verifier in a single atomic write.
    fn store_pin_verifier(&self, user_id: &Uuid, verifier: &PinVerifier) -> Result<()>;
}
