//! `notevault pin`: toggle a note's pinned flag.

use crate::cli::output;
use crate::cli::{finish, open_notebook, resolve_note_id, Cli};
use crate::errors::{NoteVaultError, Result};

/// Execute the `pin` command.
pub async fn execute(cli: &Cli, id: &str) -> Result<()> {
    let notebook = open_notebook(cli, true).await?;
    let id = resolve_note_id(&notebook, id)?;

    let pinned = notebook
        .toggle_pin(&id)?
        .ok_or_else(|| NoteVaultError::NoteNotFound(id.clone()))?;
    finish(&notebook).await?;

    let short = output::short_id(&id);
    if pinned {
        output::success(&format!("Pinned {short}"));
    } else {
        output::success(&format!("Unpinned {short}"));
    }
    Ok(())
}
