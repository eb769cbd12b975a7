use std::path::PathBuf;

use uuid::Uuid;

use fortress_core::crypto::{hash_pin, validate_pin, DEFAULT_PIN};
use fortress_core::{ProfileStore, SqliteStore};

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_store_path, write_config, FortressConfig};
use crate::errors::CliError;
use crate::helpers::read_new_pin;
use crate::ui::{badge, hint, print, receipt, Badge, UiContext};

/// Bytes of randomness behind `--generate-secret`.
const GENERATED_SECRET_BYTES: usize = 32;

pub fn handle_init(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path(ctx.cli())?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}\nHint: Pass --force to overwrite it.",
            config_path.display()
        ))
        .into());
    }

    let store_path = init_store_path(ctx, args)?;
    let secret = if args.generate_secret {
        Some(generate_secret()?)
    } else {
        None
    };
    let insecure_defaults = !args.no_insecure_defaults;

    let config = FortressConfig::new(
        store_path.clone(),
        Uuid::new_v4(),
        secret,
        insecure_defaults,
        args.idle_lock.unwrap_or(0),
    );

    // Without the default PIN the user needs a verifier before first unlock.
    let provisioned_pin = if insecure_defaults {
        None
    } else {
        let pin = read_new_pin()?;
        validate_pin(&pin)?;
        Some(hash_pin(&pin)?)
    };

    // Opening creates the file and schema; an existing store is reused.
    let store = SqliteStore::open(&store_path)?;
    if let Some(verifier) = provisioned_pin {
        store.store_pin_verifier(&config.identity.user_id, &verifier)?;
    }
    write_config(&config_path, &config)?;
    tracing::info!(
        config = %config_path.display(),
        store = %store_path.display(),
        "initialized fortress"
    );

    if ctx.quiet() {
        return Ok(());
    }

    let ui_ctx = ctx.ui_context(false, None)?;
    let config_display = config_path.display().to_string();
    let store_display = store_path.display().to_string();
    let user_display = config.identity.user_id.to_string();
    print(
        &ui_ctx,
        &receipt(
            &ui_ctx,
            "Fortress initialized",
            &[
                ("Config", config_display.as_str()),
                ("Store", store_display.as_str()),
                ("User", user_display.as_str()),
            ],
        ),
    );
    print_security_notes(&ui_ctx, &config);
    Ok(())
}

fn init_store_path(ctx: &AppContext, args: &InitArgs) -> anyhow::Result<PathBuf> {
    let explicit = args
        .path
        .as_deref()
        .or(ctx.cli().store.as_deref())
        .filter(|path| !path.trim().is_empty());
    match explicit {
        Some(path) => Ok(PathBuf::from(path)),
        None => default_store_path(),
    }
}

fn generate_secret() -> anyhow::Result<String> {
    let mut bytes = [0u8; GENERATED_SECRET_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| anyhow::anyhow!("Failed to generate vault secret: {}", e))?;
    Ok(hex::encode(bytes))
}

fn print_security_notes(ui_ctx: &UiContext, config: &FortressConfig) {
    let has_secret = config.vault.secret.is_some();
    if config.security.insecure_defaults {
        if !has_secret {
            print(
                ui_ctx,
                &badge(
                    ui_ctx,
                    Badge::Warn,
                    "Secure notes use the built-in demo secret until one is configured",
                ),
            );
        }
        print(
            ui_ctx,
            &badge(
                ui_ctx,
                Badge::Warn,
                &format!("Default PIN {} is accepted until you set one", DEFAULT_PIN),
            ),
        );
        print(ui_ctx, &hint(ui_ctx, "Run `fortress pin set` now."));
    } else if !has_secret {
        // Key resolution fails without a secret once the demo fallback is off.
        print(
            ui_ctx,
            &badge(
                ui_ctx,
                Badge::Info,
                "Insecure defaults are off; set FORTRESS_VAULT_SECRET before using the store",
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secret_is_hex() {
        let secret = generate_secret().unwrap();
        assert_eq!(secret.len(), GENERATED_SECRET_BYTES * 2);
        assert!(hex::decode(&secret).is_ok());
        assert_ne!(secret, generate_secret().unwrap());
    }
}
