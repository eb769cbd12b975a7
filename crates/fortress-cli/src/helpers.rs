//! Input and parsing helper functions for the CLI.

use std::io::{self, IsTerminal, Read};

use dialoguer::{Confirm, Password};
use uuid::Uuid;
use zeroize::Zeroizing;

use fortress_core::storage::{Folder, Note, NoteType};

use crate::constants::{env, MIN_ID_PREFIX};
use crate::errors::CliError;

/// Whether prompts can be shown.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal()
}

/// Read a PIN from `env_var`, or prompt for it on a terminal.
///
/// Returns `Ok(None)` when neither is available.
pub fn read_pin(prompt: &str, env_var: &str) -> anyhow::Result<Option<Zeroizing<String>>> {
    if let Ok(value) = std::env::var(env_var) {
        if !value.is_empty() {
            return Ok(Some(Zeroizing::new(value)));
        }
    }
    if !is_interactive() {
        return Ok(None);
    }
    Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .map(|pin| Some(Zeroizing::new(pin)))
        .map_err(|e| anyhow::anyhow!("Failed to read PIN: {}", e))
}

/// Read a new PIN from `FORTRESS_NEW_PIN`, or prompt twice on a terminal.
pub fn read_new_pin() -> anyhow::Result<Zeroizing<String>> {
    if let Ok(value) = std::env::var(env::NEW_PIN) {
        if !value.is_empty() {
            return Ok(Zeroizing::new(value));
        }
    }
    if !is_interactive() {
        return Err(CliError::invalid_input(
            "No new PIN provided and no TTY available. Set FORTRESS_NEW_PIN.",
        )
        .into());
    }
    Password::new()
        .with_prompt("New PIN")
        .with_confirmation("Confirm new PIN", "PINs do not match")
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| anyhow::anyhow!("Failed to read PIN: {}", e))
}

/// Body from `--body`, else from stdin when it is piped.
pub fn read_body(body: Option<String>) -> anyhow::Result<Option<String>> {
    if body.is_some() {
        return Ok(body);
    }
    if is_interactive() {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
    let trimmed = buffer.trim_end_matches(['\n', '\r']);
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

/// Ask for confirmation; without a terminal the answer is no.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    if !is_interactive() {
        return Ok(false);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read confirmation: {}", e))
}

pub fn parse_note_type(value: &str) -> anyhow::Result<NoteType> {
    value
        .parse::<NoteType>()
        .map_err(|e| CliError::invalid_input(e.to_string()).into())
}

/// Resolve a full UUID or a unique prefix against the user's notes.
pub fn resolve_note_id(input: &str, notes: &[Note]) -> anyhow::Result<Uuid> {
    let ids: Vec<Uuid> = notes.iter().map(|note| note.id).collect();
    resolve_id(input, &ids, "note", "fortress note list")
}

/// Resolve a full UUID or a unique prefix against the user's folders.
pub fn resolve_folder_id(input: &str, folders: &[Folder]) -> anyhow::Result<Uuid> {
    let ids: Vec<Uuid> = folders.iter().map(|folder| folder.id).collect();
    resolve_id(input, &ids, "folder", "fortress folder list")
}

fn resolve_id(input: &str, candidates: &[Uuid], kind: &str, list_cmd: &str) -> anyhow::Result<Uuid> {
    let trimmed = input.trim();
    if let Ok(id) = Uuid::parse_str(trimmed) {
        return Ok(id);
    }

    let prefix = trimmed.to_ascii_lowercase();
    if prefix.len() < MIN_ID_PREFIX || !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
    {
        return Err(CliError::invalid_input(format!(
            "Invalid {} ID: {} (use a UUID or at least {} of its leading characters)",
            kind, input, MIN_ID_PREFIX
        ))
        .into());
    }

    let matches: Vec<&Uuid> = candidates
        .iter()
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();
    match matches.as_slice() {
        [id] => Ok(**id),
        [] => Err(CliError::not_found(
            format!("No {} matches {}", kind, input),
            format!("Hint: Run `{}` to find IDs.", list_cmd),
        )
        .into()),
        _ => Err(CliError::invalid_input(format!(
            "{} {} is ambiguous ({} matches); use more characters",
            capitalize(kind),
            input,
            matches.len()
        ))
        .into()),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> Vec<Uuid> {
        vec![
            Uuid::parse_str("7a2e3c0b-1234-5678-9abc-def012345678").unwrap(),
            Uuid::parse_str("7a2e9999-1234-5678-9abc-def012345678").unwrap(),
            Uuid::parse_str("0b1c2d3e-1234-5678-9abc-def012345678").unwrap(),
        ]
    }

    fn exit_code(err: anyhow::Error) -> i32 {
        err.downcast_ref::<CliError>().unwrap().exit_code()
    }

    #[test]
    fn test_full_uuid_accepted() {
        let id = Uuid::new_v4();
        assert_eq!(resolve_id(&id.to_string(), &[], "note", "x").unwrap(), id);
    }

    #[test]
    fn test_unique_prefix() {
        assert_eq!(
            resolve_id("0B1C", &ids(), "note", "x").unwrap(),
            ids()[2]
        );
        assert_eq!(
            resolve_id("7a2e3c", &ids(), "note", "x").unwrap(),
            ids()[0]
        );
    }

    #[test]
    fn test_ambiguous_prefix() {
        let err = resolve_id("7a2e", &ids(), "note", "x").unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
        assert_eq!(exit_code(err), 4);
    }

    #[test]
    fn test_unknown_prefix() {
        let err = resolve_id("ffff", &ids(), "folder", "x").unwrap_err();
        assert_eq!(exit_code(err), 3);
    }

    #[test]
    fn test_short_or_invalid_prefix() {
        assert_eq!(exit_code(resolve_id("7a", &ids(), "note", "x").unwrap_err()), 4);
        assert_eq!(
            exit_code(resolve_id("zzzzzz", &ids(), "note", "x").unwrap_err()),
            4
        );
    }

    #[test]
    fn test_parse_note_type() {
        assert_eq!(parse_note_type("secure").unwrap(), NoteType::Secure);
        assert_eq!(exit_code(parse_note_type("diary").unwrap_err()), 4);
    }
}
