//! Fortress CLI - nested notes with a PIN-gated vault for secure notes
//!
//! This is the command-line interface for Fortress. It wires the core
//! notebook, PIN vault, and session gate to a local SQLite store.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;
mod ui;

use clap::Parser;
use fortress_core::VERSION;

use crate::app::AppContext;
use crate::cli::{Cli, Commands, FolderSubcommand, NoteSubcommand, PinSubcommand};
use crate::commands::{folders, init, misc, notes, pin, session};
use crate::errors::exit_code_for;
use crate::ui::{print_error, UiContext};

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx, &cli) {
        tracing::debug!(error = ?e, "command failed");
        let ui_ctx = ctx
            .ui_context(false, None)
            .unwrap_or_else(|_| UiContext::plain());
        let (message, hint) = split_hint(&e.to_string());
        print_error(&ui_ctx, &message, hint.as_deref());
        std::process::exit(exit_code_for(&e));
    }
}

/// Split an error's text into the message and its trailing `Hint:` line.
fn split_hint(error: &str) -> (String, Option<String>) {
    match error.find("\nHint:") {
        Some(idx) => (
            error[..idx].to_string(),
            Some(error[idx + 1..].trim_start_matches("Hint:").trim().to_string()),
        ),
        None => (error.to_string(), None),
    }
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => {
            init::handle_init(ctx, args)?;
        }
        Some(Commands::Note(command)) => match command {
            NoteSubcommand::New(args) => notes::handle_new(ctx, args)?,
            NoteSubcommand::List(args) => notes::handle_list(ctx, args)?,
            NoteSubcommand::Show(args) => notes::handle_show(ctx, args)?,
            NoteSubcommand::Edit(args) => notes::handle_edit(ctx, args)?,
            NoteSubcommand::Delete(args) => notes::handle_delete(ctx, args)?,
        },
        Some(Commands::Folder(command)) => match command {
            FolderSubcommand::New { name, parent } => {
                folders::handle_new(ctx, name, parent.as_deref())?;
            }
            FolderSubcommand::List { json } => folders::handle_list(ctx, *json)?,
            FolderSubcommand::Rename { id, name } => folders::handle_rename(ctx, id, name)?,
            FolderSubcommand::Delete { id, force } => folders::handle_delete(ctx, id, *force)?,
        },
        Some(Commands::Pin(command)) => match command {
            PinSubcommand::Set => pin::handle_set(ctx)?,
            PinSubcommand::Check => pin::handle_check(ctx)?,
        },
        Some(Commands::Session) => {
            session::handle_session(ctx)?;
        }
        Some(Commands::Completions { shell }) => {
            misc::handle_completions(*shell)?;
        }
        None => {
            println!("Fortress v{}", VERSION);
            println!("\nQuickstart:");
            println!("  fortress init");
            println!("  fortress note new --title \"Groceries\" --body \"milk\"");
            println!("  fortress note new --type secure --title \"Bank\" --body \"...\"");
            println!("  fortress note list");
            println!("  fortress note show <id>");
            println!("\nRun `fortress --help` for full usage.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_hint() {
        let (message, hint) = split_hint("Vault is locked\nHint: Set FORTRESS_PIN.");
        assert_eq!(message, "Vault is locked");
        assert_eq!(hint.as_deref(), Some("Set FORTRESS_PIN."));

        let (message, hint) = split_hint("boom");
        assert_eq!(message, "boom");
        assert!(hint.is_none());
    }
}
