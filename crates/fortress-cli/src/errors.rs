//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use fortress_core::FortressError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, store, note, folder)
    NotFound { message: String, hint: String },

    /// Authentication failed (incorrect PIN)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Secure content needs an unlocked vault
    VaultLocked { hint: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::VaultLocked { hint } => write!(f, "Vault is locked\n{}", hint),
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and optional hint.
    pub fn auth_failed(message: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: None,
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Create a VaultLocked error with a hint on how to unlock.
    pub fn vault_locked(hint: impl Into<String>) -> Self {
        CliError::VaultLocked { hint: hint.into() }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::VaultLocked { .. } => exit_codes::VAULT_LOCKED,
        }
    }
}

/// Exit code for any error surfaced by a command.
///
/// Typed CLI errors keep their own code; core errors are classified by kind;
/// anything else is a generic failure.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    if let Some(cli_error) = error.downcast_ref::<CliError>() {
        return cli_error.exit_code();
    }

    match error.downcast_ref::<FortressError>() {
        Some(core) if core.is_not_found() => exit_codes::NOT_FOUND,
        Some(FortressError::InvalidInput(_)) => exit_codes::INVALID_INPUT,
        Some(FortressError::Unauthorized(_)) => exit_codes::AUTH_FAILED,
        Some(FortressError::VaultLocked) => exit_codes::VAULT_LOCKED,
        _ => exit_codes::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_cli_error_exit_codes() {
        assert_eq!(CliError::not_found("x", "y").exit_code(), 3);
        assert_eq!(CliError::invalid_input("x").exit_code(), 4);
        assert_eq!(CliError::auth_failed("x").exit_code(), 5);
        assert_eq!(CliError::vault_locked("x").exit_code(), 7);
    }

    #[test]
    fn test_core_errors_classified() {
        let not_found = anyhow::Error::new(FortressError::NoteNotFound(Uuid::new_v4()));
        assert_eq!(exit_code_for(&not_found), exit_codes::NOT_FOUND);

        let locked = anyhow::Error::new(FortressError::VaultLocked);
        assert_eq!(exit_code_for(&locked), exit_codes::VAULT_LOCKED);

        let unauthorized =
            anyhow::Error::new(FortressError::Unauthorized("Incorrect current PIN".into()));
        assert_eq!(exit_code_for(&unauthorized), exit_codes::AUTH_FAILED);

        let invalid = anyhow::Error::new(FortressError::InvalidInput("short".into()));
        assert_eq!(exit_code_for(&invalid), exit_codes::INVALID_INPUT);
    }

    #[test]
    fn test_untyped_errors_are_generic() {
        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), exit_codes::FAILURE);
    }

    #[test]
    fn test_display_includes_hint() {
        let err = CliError::auth_failed_with_hint("Incorrect PIN", "Hint: try again");
        assert_eq!(err.to_string(), "Incorrect PIN\nHint: try again");
    }
}
