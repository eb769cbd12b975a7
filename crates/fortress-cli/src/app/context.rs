//! Application context for the Fortress CLI.
//!
//! Provides a unified context that combines CLI arguments with the
//! lazily-loaded config, and opens the services commands work with.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;
use secrecy::SecretString;

use fortress_core::{
    ContentCodec, FortressError, IdleLock, InsecureDefaults, Notebook, PinVault, SecretKey,
    SqliteStore, StaticIdentity, VaultSession,
};

use crate::cli::Cli;
use crate::config::FortressConfig;
use crate::constants::env;
use crate::errors::CliError;
use crate::helpers::read_pin;
use crate::ui::UiContext;

use super::resolver::{load_config, missing_store_error, resolve_store_path};

/// Application context that bundles CLI args with configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<FortressConfig>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    /// Check if quiet mode is enabled.
    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// Get the config, loading it on first use.
    pub fn config(&self) -> anyhow::Result<&FortressConfig> {
        self.config.get_or_try_init(|| load_config(self.cli))
    }

    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        Ok(resolve_store_path(self.cli, self.config()?))
    }

    pub fn insecure_defaults(&self) -> anyhow::Result<InsecureDefaults> {
        Ok(InsecureDefaults::from_flag(
            self.config()?.security.insecure_defaults,
        ))
    }

    /// A fresh, locked vault session with the configured idle lock.
    pub fn new_session(&self) -> anyhow::Result<VaultSession> {
        let session = VaultSession::new();
        Ok(match IdleLock::from_secs(self.config()?.security.idle_lock_seconds) {
            Some(idle) => session.with_idle_lock(idle),
            None => session,
        })
    }

    pub fn ui_context(&self, json: bool, format: Option<&str>) -> anyhow::Result<UiContext> {
        UiContext::from_env(json, format)
    }

    /// Open the store and resolve the key and identity.
    pub fn open_workspace(&self) -> anyhow::Result<Workspace> {
        let config = self.config()?;
        let store_path = self.store_path()?;
        if !store_path.exists() {
            return Err(missing_store_error(&store_path).into());
        }

        let defaults = self.insecure_defaults()?;
        let key = SecretKey::resolve(configured_secret(config).as_ref(), defaults)?;

        Ok(Workspace {
            store: SqliteStore::open(&store_path)?,
            codec: ContentCodec::new(key),
            identity: StaticIdentity::new(config.identity.user_id),
            defaults,
        })
    }
}

/// `FORTRESS_VAULT_SECRET` if set, else `vault.secret` from the config.
fn configured_secret(config: &FortressConfig) -> Option<SecretString> {
    if let Ok(value) = std::env::var(env::VAULT_SECRET) {
        if !value.trim().is_empty() {
            return Some(SecretString::from(value));
        }
    }
    config
        .vault
        .secret
        .as_ref()
        .map(|secret| SecretString::from(secret.clone()))
}

/// Everything a command needs to work on notes for the configured user.
pub struct Workspace {
    pub store: SqliteStore,
    pub codec: ContentCodec,
    pub identity: StaticIdentity,
    pub defaults: InsecureDefaults,
}

impl Workspace {
    pub fn notebook(&self) -> Notebook<'_> {
        Notebook::new(&self.store, &self.store, &self.codec, &self.identity)
    }

    pub fn pins(&self) -> PinVault<'_> {
        PinVault::new(&self.store, &self.identity, self.defaults)
    }

    /// Unlock `session` with a PIN from `FORTRESS_PIN` or a prompt.
    ///
    /// # Errors
    ///
    /// - `CliError::VaultLocked` if no PIN is available
    /// - `CliError::AuthFailed` if the PIN is wrong
    pub fn unlock(&self, session: &mut VaultSession) -> anyhow::Result<()> {
        let pin = read_pin("Vault PIN", env::PIN)?.ok_or_else(|| {
            CliError::vault_locked("Hint: Set FORTRESS_PIN or run in a terminal to enter the PIN.")
        })?;
        self.unlock_with(session, &pin)
    }

    /// Run `op` against `session`, unlocking and retrying once if it needs
    /// the vault.
    pub fn with_unlock<T>(
        &self,
        session: &mut VaultSession,
        op: impl Fn(&VaultSession) -> fortress_core::Result<T>,
    ) -> anyhow::Result<T> {
        match op(session) {
            Err(FortressError::VaultLocked) => {
                self.unlock(session)?;
                Ok(op(session)?)
            }
            other => Ok(other?),
        }
    }

    pub fn unlock_with(&self, session: &mut VaultSession, pin: &str) -> anyhow::Result<()> {
        if !session.unlock(pin, &self.pins())? {
            return Err(CliError::auth_failed_with_hint(
                "Incorrect PIN",
                "Hint: Change the PIN with `fortress pin set`.",
            )
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use uuid::Uuid;

    /// An in-memory workspace with the default PIN accepted.
    pub fn memory_workspace() -> Workspace {
        Workspace {
            store: SqliteStore::open_in_memory().expect("in-memory store"),
            codec: ContentCodec::new(SecretKey::from_passphrase("cli-test-secret")),
            identity: StaticIdentity::new(Uuid::new_v4()),
            defaults: InsecureDefaults::Allowed,
        }
    }
}
