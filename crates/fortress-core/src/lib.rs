//! # Fortress Core
//!
//! Core library for Fortress - a nested note-taking tool with a PIN-gated
//! vault for secure notes.
//!
//! This crate provides the domain logic, storage abstractions, and data models
//! independent of the CLI interface.
//!
//! ## Architecture
//!
//! - **crypto**: Secret key derivation, the ciphertext envelope codec, PIN hashing
//! - **vault**: PIN verification and the per-session lock/unlock gate
//! - **identity**: Current-user lookup
//! - **storage**: Storage traits, row types, and the SQLite backend
//! - **notebook**: Note and folder operations with secure-content routing

pub mod crypto;
pub mod error;
pub mod identity;
pub mod notebook;
pub mod storage;
pub mod vault;

pub use crypto::{ContentCodec, Decrypted, DecryptFailure, SecretKey};
pub use error::{FortressError, Result};
pub use identity::{Identity, StaticIdentity};
pub use notebook::{NoteBody, NoteDraft, Notebook, OpenedNote};
pub use storage::{FolderStore, NoteStore, ProfileStore, SqliteStore};
pub use vault::{IdleLock, InsecureDefaults, PinCheck, PinVault, VaultSession, VaultState};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
