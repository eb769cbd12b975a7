//! Note and folder operations for the signed-in user.
//!
//! [`Notebook`] is where secure content is routed: content of secure notes
//! is encrypted before it reaches the store, decrypted only for an unlocked
//! [`VaultSession`], and masked in listings. Every operation is scoped to
//! the current user; rows of other users behave as if they did not exist.

use std::fmt;

use uuid::Uuid;

use crate::crypto::{ContentCodec, Decrypted, DecryptFailure, DECRYPTION_FAILED_SENTINEL};
use crate::error::{FortressError, Result};
use crate::identity::Identity;
use crate::storage::{
    Folder, FolderStore, NewFolder, NewNote, Note, NoteFilter, NoteStore, NoteType, NoteUpdate,
};
use crate::vault::VaultSession;

/// Content shown for secure notes in listings.
pub const LOCKED_CONTENT: &str = "Locked";

/// Placeholder shown instead of a secure body while the vault is locked.
pub const LOCKED_PLACEHOLDER: &str = "Content Encrypted";

/// Input for [`Notebook::create_note`]. Content is plaintext.
#[derive(Debug, Clone, Default)]
pub struct NoteDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    pub note_type: NoteType,
    pub folder_id: Option<Uuid>,
}

impl NoteDraft {
    pub fn new(note_type: NoteType) -> Self {
        Self {
            note_type,
            ..Self::default()
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn folder(mut self, folder_id: Option<Uuid>) -> Self {
        self.folder_id = folder_id;
        self
    }
}

/// The body of an opened note.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteBody {
    /// Content of a non-secure note.
    Plain(String),
    /// Decrypted content of a secure note (or legacy plaintext).
    Secure(String),
    /// Secure note opened while the vault is locked. Nothing was decrypted.
    Locked,
    /// Secure note whose stored content could not be decrypted.
    Unavailable(DecryptFailure),
}

impl NoteBody {
    /// Text to display for this body.
    pub fn display_text(&self) -> &str {
        match self {
            NoteBody::Plain(text) | NoteBody::Secure(text) => text,
            NoteBody::Locked => LOCKED_PLACEHOLDER,
            NoteBody::Unavailable(_) => DECRYPTION_FAILED_SENTINEL,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, NoteBody::Locked)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, NoteBody::Unavailable(_))
    }
}

impl fmt::Display for NoteBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_text())
    }
}

/// A note together with its resolved body.
///
/// For secure notes `note.content` is masked; the body carries the text.
#[derive(Debug, Clone)]
pub struct OpenedNote {
    pub note: Note,
    pub body: NoteBody,
}

/// Note and folder operations for the current user.
pub struct Notebook<'a> {
    notes: &'a dyn NoteStore,
    folders: &'a dyn FolderStore,
    codec: &'a ContentCodec,
    identity: &'a dyn Identity,
}

impl<'a> Notebook<'a> {
    pub fn new(
        notes: &'a dyn NoteStore,
        folders: &'a dyn FolderStore,
        codec: &'a ContentCodec,
        identity: &'a dyn Identity,
    ) -> Self {
        Self {
            notes,
            folders,
            codec,
            identity,
        }
    }

    fn current_user(&self) -> Result<Uuid> {
        self.identity
            .current_user()?
            .ok_or_else(|| FortressError::Unauthorized("User not authenticated".to_string()))
    }

    fn owned_note(&self, user_id: &Uuid, id: &Uuid) -> Result<Note> {
        match self.notes.get_note(id)? {
            Some(note) if note.user_id == *user_id => Ok(note),
            _ => Err(FortressError::NoteNotFound(*id)),
        }
    }

    fn owned_folder(&self, user_id: &Uuid, id: &Uuid) -> Result<Folder> {
        match self.folders.get_folder(id)? {
            Some(folder) if folder.user_id == *user_id => Ok(folder),
            _ => Err(FortressError::FolderNotFound(*id)),
        }
    }

    /// Create a note for the current user.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` if nobody is signed in
    /// - `FolderNotFound` if the folder is missing or belongs to someone else
    /// - `VaultLocked` when a secure draft carries content and `session` is locked
    pub fn create_note(&self, draft: NoteDraft, session: &VaultSession) -> Result<Note> {
        let user_id = self.current_user()?;

        if let Some(folder_id) = draft.folder_id {
            self.owned_folder(&user_id, &folder_id)?;
        }

        // A draft without content gets the empty default body, which holds no secret.
        let content = match draft.content {
            Some(content) if draft.note_type.is_secure() => {
                session.require_unlocked()?;
                self.codec.encrypt(&content)?
            }
            Some(content) => content,
            None => String::new(),
        };

        let mut new_note = NewNote::new(user_id, draft.note_type)
            .in_folder(draft.folder_id)
            .with_content(content);
        if let Some(title) = draft.title {
            new_note = new_note.with_title(title);
        }

        let note = self.notes.insert_note(&new_note)?;
        tracing::debug!(note = %note.id, note_type = %note.note_type, "created note");
        Ok(note)
    }

    /// List the current user's notes. Secure content is always masked.
    pub fn list_notes(&self, filter: NoteFilter) -> Result<Vec<Note>> {
        let user_id = self.current_user()?;
        let notes = self.notes.list_notes(&filter.user(user_id))?;
        Ok(notes.into_iter().map(mask_secure).collect())
    }

    /// Open a note, decrypting secure content only if `session` is unlocked.
    pub fn open_note(&self, id: &Uuid, session: &VaultSession) -> Result<OpenedNote> {
        let user_id = self.current_user()?;
        let note = self.owned_note(&user_id, id)?;

        if !note.note_type.is_secure() {
            let body = NoteBody::Plain(note.content.clone().unwrap_or_default());
            return Ok(OpenedNote { note, body });
        }

        let body = if session.is_locked() {
            NoteBody::Locked
        } else {
            match self.codec.decrypt(note.content.as_deref().unwrap_or_default()) {
                Decrypted::Plaintext(text) | Decrypted::Passthrough(text) => NoteBody::Secure(text),
                Decrypted::Failed(failure) => NoteBody::Unavailable(failure),
            }
        };

        Ok(OpenedNote {
            note: mask_secure(note),
            body,
        })
    }

    /// Apply `update` to a note. Content in `update` is plaintext.
    ///
    /// Content ends up encrypted whenever the note's resulting type is
    /// secure. Converting a secure note to another type decrypts its stored
    /// content. Any change that reads or writes secure content needs an
    /// unlocked session; title, favourite, and folder changes do not.
    ///
    /// # Errors
    ///
    /// - `VaultLocked` if secure content is involved and `session` is locked
    /// - `Crypto` if a secure note being converted cannot be decrypted
    pub fn update_note(
        &self,
        id: &Uuid,
        update: NoteUpdate,
        session: &VaultSession,
    ) -> Result<Note> {
        let user_id = self.current_user()?;
        let note = self.owned_note(&user_id, id)?;

        if let Some(Some(folder_id)) = update.folder_id {
            self.owned_folder(&user_id, &folder_id)?;
        }

        let was_secure = note.note_type.is_secure();
        let will_be_secure = update.note_type.unwrap_or(note.note_type).is_secure();
        let touches_secure = was_secure != will_be_secure
            || (update.content.is_some() && (was_secure || will_be_secure));
        if touches_secure {
            session.require_unlocked()?;
        }

        let mut stored = update;
        stored.content = match (was_secure, will_be_secure, stored.content.take()) {
            (_, true, Some(content)) => Some(self.codec.encrypt(&content)?),
            (false, true, None) => {
                Some(self.codec.encrypt(note.content.as_deref().unwrap_or_default())?)
            }
            (true, false, None) => {
                match self.codec.decrypt(note.content.as_deref().unwrap_or_default()) {
                    Decrypted::Plaintext(text) | Decrypted::Passthrough(text) => Some(text),
                    Decrypted::Failed(failure) => {
                        return Err(FortressError::Crypto(format!(
                            "Cannot convert note {}: {}",
                            id, failure
                        )))
                    }
                }
            }
            (_, _, content) => content,
        };

        self.notes.update_note(id, &stored)?;
        self.owned_note(&user_id, id)
    }

    pub fn delete_note(&self, id: &Uuid) -> Result<()> {
        let user_id = self.current_user()?;
        self.owned_note(&user_id, id)?;
        self.notes.delete_note(id)?;
        tracing::debug!(note = %id, "deleted note");
        Ok(())
    }

    /// Create a folder, optionally nested under `parent_id`.
    pub fn create_folder(&self, name: &str, parent_id: Option<Uuid>) -> Result<Folder> {
        let user_id = self.current_user()?;
        let name = validate_folder_name(name)?;

        if let Some(parent_id) = parent_id {
            self.owned_folder(&user_id, &parent_id)?;
        }

        self.folders
            .insert_folder(&NewFolder::new(user_id, name).with_parent(parent_id))
    }

    /// The current user's folders, ordered by name.
    pub fn list_folders(&self) -> Result<Vec<Folder>> {
        let user_id = self.current_user()?;
        self.folders.list_folders(&user_id)
    }

    pub fn rename_folder(&self, id: &Uuid, name: &str) -> Result<()> {
        let user_id = self.current_user()?;
        let name = validate_folder_name(name)?;
        self.owned_folder(&user_id, id)?;
        self.folders.rename_folder(id, name)
    }

    /// Delete a folder and its subfolders. Their notes move to the inbox.
    pub fn delete_folder(&self, id: &Uuid) -> Result<()> {
        let user_id = self.current_user()?;
        self.owned_folder(&user_id, id)?;
        self.folders.delete_folder(id)
    }
}

fn mask_secure(mut note: Note) -> Note {
    if note.note_type.is_secure() {
        note.content = Some(LOCKED_CONTENT.to_string());
    }
    note
}

fn validate_folder_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FortressError::InvalidInput(
            "Folder name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed)
}
