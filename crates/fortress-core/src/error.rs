//! Error types for Fortress core operations.
//!
//! Errors are descriptive at the core level; the CLI layer maps these
//! to user-facing messages and exit codes.
//!
//! Decryption failures are deliberately absent here: the codec reports them
//! as a [`crate::crypto::Decrypted::Failed`] value, never as an error.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for Fortress operations.
pub type Result<T> = std::result::Result<T, FortressError>;

/// Core error type for Fortress operations.
#[derive(Debug, Error)]
pub enum FortressError {
    /// Encryption, hashing, or key handling error
    #[error("Encryption error: {0}")]
    Crypto(String),

    /// Storage backend error (generic)
    #[error("Storage error: {0}")]
    Storage(String),

    /// SQLite-specific storage error
    #[error("SQLite error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    /// Note not found by ID
    #[error("Note not found: {0}")]
    NoteNotFound(Uuid),

    /// Folder not found by ID
    #[error("Folder not found: {0}")]
    FolderNotFound(Uuid),

    /// Invalid user input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller is not allowed to perform the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Secure content was touched while the vault session is locked
    #[error("Vault is locked")]
    VaultLocked,

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl FortressError {
    /// Whether this error means "the caller is not authorized".
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FortressError::Unauthorized(_))
    }

    /// Whether this error refers to a missing note or folder.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            FortressError::NoteNotFound(_) | FortressError::FolderNotFound(_)
        )
    }
}
