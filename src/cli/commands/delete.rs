//! `notevault delete`: remove a note.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{finish, open_notebook, resolve_note_id, Cli};
use crate::errors::{NoteVaultError, Result};

/// Execute the `delete` command.
pub async fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    let notebook = open_notebook(cli, true).await?;
    let id = resolve_note_id(&notebook, id)?;
    let title = notebook
        .note(&id)?
        .map(|n| n.title)
        .unwrap_or_default();

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete note '{title}'?"))
            .default(false)
            .interact()
            .map_err(|e| NoteVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    notebook.delete_note(&id)?;
    finish(&notebook).await?;

    output::success(&format!("Deleted note '{title}'"));
    Ok(())
}
