//! `notevault show`: print a note as plain text.

use console::style;

use crate::cli::{open_notebook, resolve_note_id, Cli};
use crate::errors::{NoteVaultError, Result};

/// Execute the `show` command.
pub async fn execute(cli: &Cli, id: &str) -> Result<()> {
    let notebook = open_notebook(cli, true).await?;
    let id = resolve_note_id(&notebook, id)?;
    let note = notebook
        .note(&id)?
        .ok_or_else(|| NoteVaultError::NoteNotFound(id.clone()))?;

    println!("{}", style(&note.title).bold());
    if !note.tags.is_empty() {
        println!("{}", style(format!("tags: {}", note.tags.join(", "))).dim());
    }
    println!(
        "{}",
        style(format!(
            "updated {} | {} snapshot(s)",
            note.updated_at.format("%Y-%m-%d %H:%M"),
            note.history.len()
        ))
        .dim()
    );
    println!();
    println!("{}", note.body.plain_text());

    Ok(())
}
