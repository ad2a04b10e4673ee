//! `notevault restore`: roll a note back to a snapshot.

use crate::cli::output;
use crate::cli::{finish, open_notebook, resolve_note_id, Cli};
use crate::errors::Result;

/// Execute the `restore` command.
pub async fn execute(cli: &Cli, id: &str, index: usize) -> Result<()> {
    let notebook = open_notebook(cli, true).await?;
    let id = resolve_note_id(&notebook, id)?;

    notebook.restore_snapshot(&id, index)?;
    finish(&notebook).await?;

    output::success(&format!(
        "Restored {} from snapshot #{index}",
        output::short_id(&id)
    ));
    Ok(())
}
