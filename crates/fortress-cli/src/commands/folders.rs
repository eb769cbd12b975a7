use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use fortress_core::storage::Folder;

use crate::app::AppContext;
use crate::errors::CliError;
use crate::helpers::{confirm, is_interactive, resolve_folder_id};
use crate::ui::theme::{styled, styles};
use crate::ui::{header, hint, print, receipt, short_id, UiContext};

pub fn handle_new(ctx: &AppContext, name: &str, parent: Option<&str>) -> anyhow::Result<()> {
    let ws = ctx.open_workspace()?;
    let notebook = ws.notebook();
    let parent_id = match parent {
        Some(input) => Some(resolve_folder_id(input, &notebook.list_folders()?)?),
        None => None,
    };

    let folder = notebook.create_folder(name, parent_id)?;
    if ctx.quiet() {
        println!("{}", folder.id);
        return Ok(());
    }
    let ui_ctx = ctx.ui_context(false, None)?;
    let id = folder.id.to_string();
    print(
        &ui_ctx,
        &receipt(
            &ui_ctx,
            "Folder created",
            &[("ID", id.as_str()), ("Name", folder.name.as_str())],
        ),
    );
    Ok(())
}

pub fn handle_list(ctx: &AppContext, json: bool) -> anyhow::Result<()> {
    let ui_ctx = ctx.ui_context(json, None)?;
    let ws = ctx.open_workspace()?;
    let folders = ws.notebook().list_folders()?;

    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&folders)?);
        return Ok(());
    }

    print(&ui_ctx, &header(&ui_ctx, "folder list", None));
    if folders.is_empty() {
        print(
            &ui_ctx,
            &hint(&ui_ctx, "No folders yet. Create one with `fortress folder new NAME`."),
        );
        return Ok(());
    }
    print(&ui_ctx, &render_tree(&ui_ctx, &folders));
    Ok(())
}

pub fn handle_rename(ctx: &AppContext, id: &str, name: &str) -> anyhow::Result<()> {
    let ws = ctx.open_workspace()?;
    let notebook = ws.notebook();
    let folder_id = resolve_folder_id(id, &notebook.list_folders()?)?;
    notebook.rename_folder(&folder_id, name)?;

    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None)?;
        let id = folder_id.to_string();
        print(
            &ui_ctx,
            &receipt(
                &ui_ctx,
                "Folder renamed",
                &[("ID", id.as_str()), ("Name", name.trim())],
            ),
        );
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, id: &str, force: bool) -> anyhow::Result<()> {
    let ws = ctx.open_workspace()?;
    let notebook = ws.notebook();
    let folders = notebook.list_folders()?;
    let folder_id = resolve_folder_id(id, &folders)?;

    if !force {
        if !is_interactive() {
            return Err(CliError::invalid_input(
                "Refusing to delete without confirmation\nHint: Pass --force to delete non-interactively.",
            )
            .into());
        }
        let name = folders
            .iter()
            .find(|folder| folder.id == folder_id)
            .map(|folder| folder.name.as_str())
            .unwrap_or_default();
        let prompt = format!(
            "Delete folder \"{}\" and its subfolders? Notes move to the inbox.",
            name
        );
        if !confirm(&prompt)? {
            if !ctx.quiet() {
                println!("Cancelled");
            }
            return Ok(());
        }
    }

    notebook.delete_folder(&folder_id)?;
    if !ctx.quiet() {
        let ui_ctx = ctx.ui_context(false, None)?;
        let id = folder_id.to_string();
        print(
            &ui_ctx,
            &receipt(&ui_ctx, "Folder deleted", &[("ID", id.as_str())]),
        );
    }
    Ok(())
}

/// Depth-first order of `folders` with each folder's nesting depth.
///
/// Siblings keep their input order. A folder whose parent is not in the
/// list is treated as a root.
pub(crate) fn folder_tree(folders: &[Folder]) -> Vec<(usize, &Folder)> {
    let known: HashSet<Uuid> = folders.iter().map(|folder| folder.id).collect();
    let mut children: HashMap<Option<Uuid>, Vec<&Folder>> = HashMap::new();
    for folder in folders {
        let parent = folder.parent_id.filter(|id| known.contains(id));
        children.entry(parent).or_default().push(folder);
    }

    let mut out = Vec::with_capacity(folders.len());
    let mut stack: Vec<(usize, &Folder)> = children
        .get(&None)
        .map(|roots| roots.iter().rev().map(|folder| (0, *folder)).collect())
        .unwrap_or_default();
    while let Some((depth, folder)) = stack.pop() {
        out.push((depth, folder));
        if let Some(kids) = children.get(&Some(folder.id)) {
            stack.extend(kids.iter().rev().map(|kid| (depth + 1, *kid)));
        }
    }
    out
}

fn render_tree(ui_ctx: &UiContext, folders: &[Folder]) -> String {
    folder_tree(folders)
        .into_iter()
        .map(|(depth, folder)| {
            if ui_ctx.mode.is_pretty() {
                let id = styled(&short_id(&folder.id), styles::dim(), ui_ctx.color);
                format!("{}{}  {}", "  ".repeat(depth), folder.name, id)
            } else {
                let parent = folder
                    .parent_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                format!("{}\t{}\t{}\t{}", folder.id, parent, depth, folder.name)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::memory_workspace;
    use crate::ui::OutputMode;

    #[test]
    fn test_folder_tree_nests_children_under_parents() {
        let ws = memory_workspace();
        let notebook = ws.notebook();
        let work = notebook.create_folder("Work", None).unwrap();
        let home = notebook.create_folder("Home", None).unwrap();
        let taxes = notebook.create_folder("Taxes", Some(home.id)).unwrap();
        let receipts = notebook.create_folder("Receipts", Some(taxes.id)).unwrap();

        let folders = notebook.list_folders().unwrap();
        let tree: Vec<(usize, Uuid)> = folder_tree(&folders)
            .into_iter()
            .map(|(depth, folder)| (depth, folder.id))
            .collect();
        assert_eq!(
            tree,
            vec![(0, home.id), (1, taxes.id), (2, receipts.id), (0, work.id)]
        );
    }

    #[test]
    fn test_render_tree_modes() {
        let ws = memory_workspace();
        let notebook = ws.notebook();
        let home = notebook.create_folder("Home", None).unwrap();
        notebook.create_folder("Taxes", Some(home.id)).unwrap();
        let folders = notebook.list_folders().unwrap();

        let pretty = UiContext {
            color: false,
            unicode: false,
            width: 80,
            mode: OutputMode::Pretty,
        };
        let out = render_tree(&pretty, &folders);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("Home"));
        assert!(lines[1].starts_with("  Taxes"));

        let plain = render_tree(&UiContext::plain(), &folders);
        let first: Vec<&str> = plain.lines().next().unwrap().split('\t').collect();
        assert_eq!(first, vec![home.id.to_string().as_str(), "-", "0", "Home"]);
    }
}
