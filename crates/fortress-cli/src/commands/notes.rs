use fortress_core::storage::{Note, NoteFilter, NoteUpdate};
use fortress_core::{NoteBody, NoteDraft, OpenedNote};

use crate::app::{AppContext, Workspace};
use crate::cli::{NoteDeleteArgs, NoteEditArgs, NoteListArgs, NoteNewArgs, NoteShowArgs};
use crate::constants::{env, DEFAULT_LIST_LIMIT};
use crate::errors::CliError;
use crate::helpers::{
    confirm, is_interactive, parse_note_type, read_body, read_pin, resolve_folder_id,
    resolve_note_id,
};
use crate::ui::{
    badge, format_datetime, header, hint, kv, preview, print, receipt, short_id, simple_table,
    truncate, Badge, UiContext,
};

const TITLE_MAX: usize = 32;
const PREVIEW_MAX: usize = 48;

pub fn handle_new(ctx: &AppContext, args: &NoteNewArgs) -> anyhow::Result<()> {
    let ws = ctx.open_workspace()?;
    let notebook = ws.notebook();

    let note_type = parse_note_type(&args.note_type)?;
    let folder_id = match args.folder.as_deref() {
        Some(input) => Some(resolve_folder_id(input, &notebook.list_folders()?)?),
        None => None,
    };

    let mut draft = NoteDraft::new(note_type).folder(folder_id);
    if let Some(title) = &args.title {
        draft = draft.title(title.clone());
    }
    if let Some(body) = read_body(args.body.clone())? {
        draft = draft.content(body);
    }

    let mut session = ctx.new_session()?;
    let note = ws.with_unlock(&mut session, |s| notebook.create_note(draft.clone(), s))?;

    if ctx.quiet() {
        println!("{}", note.id);
        return Ok(());
    }
    let ui_ctx = ctx.ui_context(false, None)?;
    print(&ui_ctx, &note_receipt(&ui_ctx, "Note created", &note));
    Ok(())
}

pub fn handle_list(ctx: &AppContext, args: &NoteListArgs) -> anyhow::Result<()> {
    let ui_ctx = ctx.ui_context(args.json, args.format.as_deref())?;
    let ws = ctx.open_workspace()?;
    let notebook = ws.notebook();

    let mut filter = NoteFilter::new().limit(args.limit.unwrap_or(DEFAULT_LIST_LIMIT));
    let mut scope_label = None;
    if let Some(input) = args.folder.as_deref() {
        let folders = notebook.list_folders()?;
        let folder_id = resolve_folder_id(input, &folders)?;
        scope_label = folders
            .iter()
            .find(|folder| folder.id == folder_id)
            .map(|folder| folder.name.clone());
        filter = filter.folder(folder_id);
    } else if args.inbox {
        scope_label = Some("inbox".to_string());
        filter = filter.inbox();
    }
    if let Some(value) = args.note_type.as_deref() {
        filter = filter.note_type(parse_note_type(value)?);
    }
    if let Some(text) = args.search.as_deref() {
        filter = filter.search(text);
    }

    let notes = notebook.list_notes(filter)?;

    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    print(&ui_ctx, &header(&ui_ctx, "note list", scope_label.as_deref()));
    if notes.is_empty() {
        print(
            &ui_ctx,
            &hint(&ui_ctx, "No notes found. Create one with `fortress note new`."),
        );
        return Ok(());
    }
    print(&ui_ctx, &notes_table(&ui_ctx, &notes));
    Ok(())
}

pub fn handle_show(ctx: &AppContext, args: &NoteShowArgs) -> anyhow::Result<()> {
    let ws = ctx.open_workspace()?;
    let notebook = ws.notebook();
    let id = resolve_note_id(&args.id, &notebook.list_notes(NoteFilter::new())?)?;

    let mut session = ctx.new_session()?;
    let peek = notebook.open_note(&id, &session)?;
    let opened = if peek.body.is_locked() {
        // Without a PIN the note is still shown, with its body withheld.
        match read_pin("Vault PIN", env::PIN)? {
            Some(pin) => {
                ws.unlock_with(&mut session, &pin)?;
                notebook.open_note(&id, &session)?
            }
            None => peek,
        }
    } else {
        peek
    };

    let ui_ctx = ctx.ui_context(args.json, None)?;
    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&opened_json(&opened))?);
        return Ok(());
    }
    print(&ui_ctx, &render_opened(&ui_ctx, &opened));
    Ok(())
}

pub fn handle_edit(ctx: &AppContext, args: &NoteEditArgs) -> anyhow::Result<()> {
    let ws = ctx.open_workspace()?;
    let notebook = ws.notebook();
    let id = resolve_note_id(&args.id, &notebook.list_notes(NoteFilter::new())?)?;

    let update = build_update(&ws, args)?;
    if update.is_empty() {
        return Err(CliError::invalid_input(
            "Nothing to change\nHint: Pass --title, --body, --type, --folder, --inbox, or --favorite.",
        )
        .into());
    }

    let mut session = ctx.new_session()?;
    let note = ws.with_unlock(&mut session, |s| notebook.update_note(&id, update.clone(), s))?;

    if ctx.quiet() {
        return Ok(());
    }
    let ui_ctx = ctx.ui_context(false, None)?;
    print(&ui_ctx, &note_receipt(&ui_ctx, "Note updated", &note));
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &NoteDeleteArgs) -> anyhow::Result<()> {
    let ws = ctx.open_workspace()?;
    let notebook = ws.notebook();
    let notes = notebook.list_notes(NoteFilter::new())?;
    let id = resolve_note_id(&args.id, &notes)?;

    if !args.force {
        if !is_interactive() {
            return Err(CliError::invalid_input(
                "Refusing to delete without confirmation\nHint: Pass --force to delete non-interactively.",
            )
            .into());
        }
        let title = notes
            .iter()
            .find(|note| note.id == id)
            .and_then(|note| note.title.clone())
            .unwrap_or_default();
        if !confirm(&format!("Delete note \"{}\"?", title))? {
            if !ctx.quiet() {
                println!("Cancelled");
            }
            return Ok(());
        }
    }

    notebook.delete_note(&id)?;
    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None)?;
        let id_display = id.to_string();
        print(
            &ui_ctx,
            &receipt(&ui_ctx, "Note deleted", &[("ID", id_display.as_str())]),
        );
    }
    Ok(())
}

fn build_update(ws: &Workspace, args: &NoteEditArgs) -> anyhow::Result<NoteUpdate> {
    let mut update = NoteUpdate::new();
    if let Some(title) = &args.title {
        update = update.title(title.clone());
    }
    if let Some(body) = &args.body {
        update = update.content(body.clone());
    }
    if let Some(value) = args.note_type.as_deref() {
        update = update.note_type(parse_note_type(value)?);
    }
    if let Some(input) = args.folder.as_deref() {
        let folder_id = resolve_folder_id(input, &ws.notebook().list_folders()?)?;
        update = update.folder(Some(folder_id));
    } else if args.inbox {
        update = update.folder(None);
    }
    if let Some(favorite) = args.favorite {
        update = update.favorite(favorite);
    }
    Ok(update)
}

fn note_receipt(ui_ctx: &UiContext, title: &str, note: &Note) -> String {
    let id = note.id.to_string();
    let note_title = note.title.clone().unwrap_or_default();
    receipt(
        ui_ctx,
        title,
        &[
            ("ID", id.as_str()),
            ("Title", note_title.as_str()),
            ("Type", note.note_type.as_str()),
        ],
    )
}

/// Rows for `note list`. Listing content is already masked for secure notes.
pub(crate) fn notes_table(ui_ctx: &UiContext, notes: &[Note]) -> String {
    let pretty = ui_ctx.mode.is_pretty();
    let rows: Vec<Vec<String>> = notes
        .iter()
        .map(|note| {
            let title = note.title.clone().unwrap_or_default();
            let favorite = if note.is_favorite { "*" } else { "" };
            if pretty {
                vec![
                    short_id(&note.id),
                    format!("{}{}", favorite, truncate(&title, TITLE_MAX)),
                    note.note_type.to_string(),
                    preview(note.content.as_deref(), PREVIEW_MAX),
                    format_datetime(&note.updated_at, true),
                ]
            } else {
                vec![
                    note.id.to_string(),
                    note.note_type.to_string(),
                    format_datetime(&note.updated_at, false),
                    title,
                ]
            }
        })
        .collect();

    if pretty {
        simple_table(ui_ctx, &["ID", "Title", "Type", "Content", "Updated"], &rows)
    } else {
        simple_table(ui_ctx, &[], &rows)
    }
}

/// Metadata lines followed by the body, or a notice when it is withheld.
pub(crate) fn render_opened(ui_ctx: &UiContext, opened: &OpenedNote) -> String {
    let note = &opened.note;
    let mut lines = vec![
        header(ui_ctx, "note show", Some(short_id(&note.id).as_str())),
        kv(ui_ctx, "Title", note.title.as_deref().unwrap_or_default()),
        kv(ui_ctx, "Type", note.note_type.as_str()),
        kv(
            ui_ctx,
            "Folder",
            &note
                .folder_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "inbox".to_string()),
        ),
        kv(ui_ctx, "Favorite", if note.is_favorite { "yes" } else { "no" }),
        kv(
            ui_ctx,
            "Updated",
            &format_datetime(&note.updated_at, ui_ctx.mode.is_pretty()),
        ),
    ];
    if ui_ctx.mode.is_pretty() {
        lines.push(String::new());
    }

    match &opened.body {
        NoteBody::Locked => {
            lines.push(badge(ui_ctx, Badge::Locked, opened.body.display_text()));
            lines.push(hint(
                ui_ctx,
                "Set FORTRESS_PIN or run in a terminal to unlock secure notes.",
            ));
        }
        NoteBody::Unavailable(reason) => {
            tracing::debug!(note = %note.id, %reason, "secure note unavailable");
            lines.push(badge(ui_ctx, Badge::Err, opened.body.display_text()));
        }
        NoteBody::Plain(text) | NoteBody::Secure(text) => {
            if ui_ctx.mode.is_pretty() {
                lines.push(text.clone());
            } else {
                lines.push(String::new());
                lines.push(text.clone());
            }
        }
    }
    lines.join("\n")
}

fn opened_json(opened: &OpenedNote) -> serde_json::Value {
    let note = &opened.note;
    serde_json::json!({
        "id": note.id,
        "user_id": note.user_id,
        "folder_id": note.folder_id,
        "title": note.title,
        "type": note.note_type,
        "is_favorite": note.is_favorite,
        "created_at": note.created_at,
        "updated_at": note.updated_at,
        "content": opened.body.display_text(),
        "locked": opened.body.is_locked(),
        "unavailable": opened.body.is_unavailable(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::memory_workspace;
    use crate::ui::OutputMode;
    use fortress_core::crypto::DEFAULT_PIN;
    use fortress_core::storage::NoteType;
    use fortress_core::VaultSession;

    fn pretty_ctx() -> UiContext {
        UiContext {
            color: false,
            unicode: false,
            width: 120,
            mode: OutputMode::Pretty,
        }
    }

    #[test]
    fn test_table_never_shows_secure_plaintext() {
        let ws = memory_workspace();
        let mut session = VaultSession::new();
        ws.unlock_with(&mut session, DEFAULT_PIN).unwrap();
        let notebook = ws.notebook();
        notebook
            .create_note(
                NoteDraft::new(NoteType::Secure)
                    .title("Bank")
                    .content("acct 12345"),
                &session,
            )
            .unwrap();
        notebook
            .create_note(
                NoteDraft::new(NoteType::General)
                    .title("Groceries")
                    .content("milk\neggs"),
                &session,
            )
            .unwrap();

        let notes = notebook.list_notes(NoteFilter::new()).unwrap();
        let pretty = notes_table(&pretty_ctx(), &notes);
        assert!(pretty.contains("Locked"));
        assert!(pretty.contains("milk eggs"));
        assert!(!pretty.contains("acct 12345"));

        let plain = notes_table(&UiContext::plain(), &notes);
        assert_eq!(plain.lines().count(), 2);
        assert!(!plain.contains("acct 12345"));
    }

    #[test]
    fn test_render_locked_note() {
        let ws = memory_workspace();
        let mut session = VaultSession::new();
        ws.unlock_with(&mut session, DEFAULT_PIN).unwrap();
        let notebook = ws.notebook();
        let note = notebook
            .create_note(
                NoteDraft::new(NoteType::Secure)
                    .title("Bank")
                    .content("acct 12345"),
                &session,
            )
            .unwrap();

        let locked = notebook.open_note(&note.id, &VaultSession::new()).unwrap();
        let out = render_opened(&UiContext::plain(), &locked);
        assert!(out.contains("Content Encrypted"));
        assert!(out.contains("hint="));
        assert!(!out.contains("acct 12345"));

        let unlocked = notebook.open_note(&note.id, &session).unwrap();
        let out = render_opened(&UiContext::plain(), &unlocked);
        assert!(out.contains("acct 12345"));
        assert!(out.contains("type=secure"));
    }

    #[test]
    fn test_opened_json_reports_lock_state() {
        let ws = memory_workspace();
        let session = VaultSession::new();
        let notebook = ws.notebook();
        let note = notebook
            .create_note(NoteDraft::new(NoteType::Todo).content("call mom"), &session)
            .unwrap();

        let value = opened_json(&notebook.open_note(&note.id, &session).unwrap());
        assert_eq!(value["type"], "todo");
        assert_eq!(value["content"], "call mom");
        assert_eq!(value["locked"], false);
        assert_eq!(value["title"], "Untitled Note");
    }
}
