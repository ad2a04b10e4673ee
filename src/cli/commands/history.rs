//! `notevault history`: list a note's snapshots.

use crate::cli::output;
use crate::cli::{open_notebook, resolve_note_id, Cli};
use crate::errors::{NoteVaultError, Result};

/// Execute the `history` command.
pub async fn execute(cli: &Cli, id: &str) -> Result<()> {
    let notebook = open_notebook(cli, true).await?;
    let id = resolve_note_id(&notebook, id)?;
    let note = notebook
        .note(&id)?
        .ok_or_else(|| NoteVaultError::NoteNotFound(id.clone()))?;

    output::info(&format!("'{}': {} snapshot(s)", note.title, note.history.len()));
    output::print_history_table(&note.history);
    if !note.history.is_empty() {
        output::tip("Run `notevault diff <ID> <#>` to compare, `notevault restore <ID> <#>` to roll back.");
    }
    Ok(())
}
