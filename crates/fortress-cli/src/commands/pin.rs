use fortress_core::FortressError;

use crate::app::AppContext;
use crate::constants::env;
use crate::errors::CliError;
use crate::helpers::{read_new_pin, read_pin};
use crate::ui::{badge, print, Badge};

pub fn handle_set(ctx: &AppContext) -> anyhow::Result<()> {
    let ws = ctx.open_workspace()?;
    let old_pin = read_pin("Current PIN", env::PIN)?.ok_or_else(|| {
        CliError::invalid_input("No current PIN provided and no TTY available. Set FORTRESS_PIN.")
    })?;
    let new_pin = read_new_pin()?;

    match ws.pins().update_pin(&old_pin, &new_pin) {
        Ok(()) => {}
        Err(FortressError::Unauthorized(message)) => {
            return Err(CliError::auth_failed(message).into());
        }
        Err(e) => return Err(e.into()),
    }

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None)?;
        print(&ui_ctx, &badge(&ui_ctx, Badge::Ok, "Vault PIN updated"));
    }
    Ok(())
}

pub fn handle_check(ctx: &AppContext) -> anyhow::Result<()> {
    let ws = ctx.open_workspace()?;
    let pin = read_pin("PIN", env::PIN)?.ok_or_else(|| {
        CliError::invalid_input("No PIN provided and no TTY available. Set FORTRESS_PIN.")
    })?;

    if !ws.pins().verify_pin(&pin)? {
        return Err(CliError::auth_failed("Incorrect PIN").into());
    }
    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None)?;
        print(&ui_ctx, &badge(&ui_ctx, Badge::Ok, "PIN accepted"));
    }
    Ok(())
}
