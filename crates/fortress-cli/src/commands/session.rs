//! Interactive session holding one vault gate for its whole lifetime.
//!
//! Each `fortress` invocation otherwise starts locked and forgets the unlock
//! when it exits. Inside a session the vault stays unlocked until `lock`,
//! the idle timeout, or the end of input.

use std::io::{self, BufRead, Write};

use fortress_core::storage::NoteFilter;
use fortress_core::VaultSession;
use zeroize::Zeroizing;

use crate::app::{AppContext, Workspace};
use crate::constants::{env, DEFAULT_LIST_LIMIT};
use crate::helpers::{is_interactive, read_pin, resolve_note_id};
use crate::ui::render::error_message;
use crate::ui::{badge, kv, Badge, UiContext};

use super::notes::{notes_table, render_opened};

const HELP: &str = "\
Commands:
  status        Show whether the vault is locked
  unlock [PIN]  Unlock the vault (prompts or reads FORTRESS_PIN without PIN)
  lock          Lock the vault
  list          List notes
  show ID       Show a note (secure notes need an unlocked vault)
  help          Show this help
  quit          Leave the session";

pub fn handle_session(ctx: &AppContext) -> anyhow::Result<()> {
    let ws = ctx.open_workspace()?;
    let mut session = ctx.new_session()?;
    let ui_ctx = ctx.ui_context(false, None)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_session(
        &ws,
        &mut session,
        &ui_ctx,
        stdin.lock(),
        stdout.lock(),
        is_interactive(),
    )
}

enum Step {
    Continue,
    Quit,
}

/// Read commands from `input` until `quit` or end of input.
///
/// Command failures are reported on `output` and do not end the session.
pub fn run_session<R: BufRead, W: Write>(
    ws: &Workspace,
    session: &mut VaultSession,
    ui_ctx: &UiContext,
    input: R,
    mut output: W,
    interactive: bool,
) -> anyhow::Result<()> {
    if interactive {
        writeln!(output, "Fortress session. Type `help` for commands.")?;
    }

    let mut lines = input.lines();
    loop {
        if interactive {
            let state = if session.is_locked() { "locked" } else { "unlocked" };
            write!(output, "fortress ({})> ", state)?;
            output.flush()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if session.enforce_idle() {
            writeln!(
                output,
                "{}",
                badge(ui_ctx, Badge::Locked, "Vault locked after inactivity")
            )?;
        }

        let step = match execute(ws, session, ui_ctx, line) {
            Ok((step, message)) => {
                if !message.is_empty() {
                    writeln!(output, "{}", message)?;
                }
                step
            }
            Err(e) => {
                writeln!(output, "{}", error_message(ui_ctx, &e.to_string(), None))?;
                Step::Continue
            }
        };
        session.touch();

        if let Step::Quit = step {
            break;
        }
    }

    session.lock();
    Ok(())
}

fn execute(
    ws: &Workspace,
    session: &mut VaultSession,
    ui_ctx: &UiContext,
    line: &str,
) -> anyhow::Result<(Step, String)> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default().to_ascii_lowercase();
    let argument = parts.next();

    let message = match command.as_str() {
        "quit" | "exit" => return Ok((Step::Quit, String::new())),
        "help" | "?" => HELP.to_string(),
        "status" => kv(
            ui_ctx,
            "Vault",
            if session.is_locked() { "locked" } else { "unlocked" },
        ),
        "lock" => {
            session.lock();
            badge(ui_ctx, Badge::Locked, "Vault locked")
        }
        "unlock" => {
            let pin = match argument {
                Some(pin) => Zeroizing::new(pin.to_string()),
                None => read_pin("Vault PIN", env::PIN)?
                    .ok_or_else(|| anyhow::anyhow!("No PIN given (try `unlock PIN`)"))?,
            };
            ws.unlock_with(session, &pin)?;
            badge(ui_ctx, Badge::Ok, "Vault unlocked")
        }
        "list" => {
            let notes = ws
                .notebook()
                .list_notes(NoteFilter::new().limit(DEFAULT_LIST_LIMIT))?;
            if notes.is_empty() {
                "No notes".to_string()
            } else {
                notes_table(ui_ctx, &notes)
            }
        }
        "show" => {
            let input = argument.ok_or_else(|| anyhow::anyhow!("Usage: show ID"))?;
            let notebook = ws.notebook();
            let id = resolve_note_id(input, &notebook.list_notes(NoteFilter::new())?)?;
            render_opened(ui_ctx, &notebook.open_note(&id, session)?)
        }
        other => format!("Unknown command: {} (try `help`)", other),
    };
    Ok((Step::Continue, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::app::test_support::memory_workspace;
    use fortress_core::crypto::DEFAULT_PIN;
    use fortress_core::storage::NoteType;
    use fortress_core::{IdleLock, NoteDraft};

    fn run(ws: &Workspace, session: &mut VaultSession, script: &str) -> String {
        let mut out = Vec::new();
        run_session(
            ws,
            session,
            &UiContext::plain(),
            script.as_bytes(),
            &mut out,
            false,
        )
        .unwrap();
        String::from_utf8(out).unwrap()
    }

    fn secure_note(ws: &Workspace) -> String {
        let mut session = VaultSession::new();
        ws.unlock_with(&mut session, DEFAULT_PIN).unwrap();
        ws.notebook()
            .create_note(
                NoteDraft::new(NoteType::Secure)
                    .title("Bank")
                    .content("acct 12345"),
                &session,
            )
            .unwrap()
            .id
            .to_string()
    }

    #[test]
    fn test_unlock_show_lock_show() {
        let ws = memory_workspace();
        let id = secure_note(&ws);
        let mut session = VaultSession::new();

        let script = format!(
            "status\nshow {id}\nunlock {pin}\nstatus\nshow {id}\nlock\nshow {id}\nquit\n",
            id = id,
            pin = DEFAULT_PIN
        );
        let out = run(&ws, &mut session, &script);

        assert!(out.contains("vault=locked"));
        assert!(out.contains("vault=unlocked"));
        assert_eq!(out.matches("acct 12345").count(), 1);
        assert_eq!(out.matches("Content Encrypted").count(), 2);
        assert!(session.is_locked());
    }

    #[test]
    fn test_wrong_pin_reports_and_continues() {
        let ws = memory_workspace();
        let mut session = VaultSession::new();

        let out = run(&ws, &mut session, "unlock 0000\nstatus\n");
        assert!(out.contains("error=Incorrect PIN"));
        assert!(out.contains("vault=locked"));
    }

    #[test]
    fn test_list_masks_secure_content() {
        let ws = memory_workspace();
        secure_note(&ws);
        let mut session = VaultSession::new();

        let out = run(&ws, &mut session, &format!("unlock {}\nlist\n", DEFAULT_PIN));
        assert!(out.contains("Bank"));
        assert!(!out.contains("acct 12345"));
    }

    #[test]
    fn test_unknown_command_and_quit() {
        let ws = memory_workspace();
        let mut session = VaultSession::new();

        let out = run(&ws, &mut session, "frobnicate\nquit\nstatus\n");
        assert!(out.contains("Unknown command: frobnicate"));
        assert!(!out.contains("vault="));
    }

    #[test]
    fn test_idle_lock_applies_before_next_command() {
        let ws = memory_workspace();
        let id = secure_note(&ws);
        let mut session =
            VaultSession::new().with_idle_lock(IdleLock::new(Duration::from_millis(0)));
        ws.unlock_with(&mut session, DEFAULT_PIN).unwrap();
        std::thread::sleep(Duration::from_millis(5));

        let out = run(&ws, &mut session, &format!("show {}\n", id));
        assert!(out.contains("Vault locked after inactivity"));
        assert!(out.contains("Content Encrypted"));
        assert!(!out.contains("acct 12345"));
    }
}
