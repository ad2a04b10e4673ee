//! `notevault duplicate`: copy a note under a new id.

use crate::cli::output;
use crate::cli::{finish, open_notebook, resolve_note_id, Cli};
use crate::errors::{NoteVaultError, Result};

/// Execute the `duplicate` command.
pub async fn execute(cli: &Cli, id: &str) -> Result<()> {
    let notebook = open_notebook(cli, true).await?;
    let id = resolve_note_id(&notebook, id)?;

    let copy = notebook
        .duplicate_note(&id)?
        .ok_or(NoteVaultError::NoteNotFound(id))?;
    finish(&notebook).await?;

    output::success(&format!("Duplicated as {}", output::short_id(&copy)));
    println!("{copy}");
    Ok(())
}
