//! Storage abstraction for Fortress.
//!
//! This module defines the storage traits and row types for notes, folders,
//! and per-account vault profiles.
//!
//! ## Contract
//!
//! Storage never transforms note content. By the time a `content` value
//! reaches a store it is already an envelope (secure notes) or plain text
//! (everything else); reads hand back exactly what was written.
//!
//! The only backend is SQLite (`SqliteStore`), used both on disk and in
//! memory.

pub mod sqlite;
pub mod traits;
pub mod types;

// Re-export public types
pub use sqlite::SqliteStore;
pub use traits::{FolderStore, NoteStore, ProfileStore};
pub use types::{
    Folder, FolderScope, NewFolder, NewNote, Note, NoteFilter, NoteType, NoteUpdate,
};
