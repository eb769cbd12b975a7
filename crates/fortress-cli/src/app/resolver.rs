//! Path resolution for config and store files.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::{default_config_path, read_config, FortressConfig};
use crate::errors::CliError;

/// Resolve the config file path (`--config` / `FORTRESS_CONFIG` first).
pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(value) = cli.config.as_deref() {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Load the config, failing with a not-found error that explains `init`.
pub fn load_config(cli: &Cli) -> anyhow::Result<FortressConfig> {
    let config_path = resolve_config_path(cli)?;
    if !config_path.exists() {
        return Err(CliError::not_found(
            format!("No config found at {}", config_path.display()),
            missing_config_hint(),
        )
        .into());
    }
    read_config(&config_path)
}

/// Resolve the store path from CLI args or config.
pub fn resolve_store_path(cli: &Cli, config: &FortressConfig) -> PathBuf {
    match cli.store.as_deref() {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from(&config.store.path),
    }
}

/// Error for a store file that does not exist.
pub fn missing_store_error(path: &Path) -> CliError {
    CliError::not_found(
        format!("No note store found at {}", path.display()),
        "Hint: Run `fortress init` or pass --store with an existing store.",
    )
}

fn missing_config_hint() -> &'static str {
    "Hint: Run `fortress init` to create one, or set FORTRESS_CONFIG=/path/to/config.toml."
}
