//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Generic failure.
    pub const FAILURE: i32 = 1;

    /// Resource not found (config, store, note, folder).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (incorrect PIN).
    pub const AUTH_FAILED: i32 = 5;

    /// Secure content requested while the vault is locked.
    pub const VAULT_LOCKED: i32 = 7;
}

/// Environment variables read by the CLI.
pub mod env {
    pub const LOG: &str = "FORTRESS_LOG";
    pub const VAULT_SECRET: &str = "FORTRESS_VAULT_SECRET";
    pub const PIN: &str = "FORTRESS_PIN";
    pub const NEW_PIN: &str = "FORTRESS_NEW_PIN";
}

/// Default `note list` size.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Minimum length of an ID prefix accepted in place of a full UUID.
pub const MIN_ID_PREFIX: usize = 4;
