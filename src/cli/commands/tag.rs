//! `notevault tag add|remove`: edit a note's tags.

use crate::cli::output;
use crate::cli::{finish, open_notebook, resolve_note_id, Cli, TagAction};
use crate::errors::Result;

/// Execute a `tag` subcommand.
pub async fn execute(cli: &Cli, action: &TagAction) -> Result<()> {
    let notebook = open_notebook(cli, true).await?;

    match action {
        TagAction::Add { id, tag } => {
            let id = resolve_note_id(&notebook, id)?;
            if notebook.add_tag(&id, tag)? {
                output::success(&format!("Tagged {} with '{}'", output::short_id(&id), tag.trim()));
            } else {
                output::info("Tag already present or empty; nothing changed.");
            }
        }
        TagAction::Remove { id, tag } => {
            let id = resolve_note_id(&notebook, id)?;
            if notebook.remove_tag(&id, tag)? {
                output::success(&format!("Removed '{}' from {}", tag.trim(), output::short_id(&id)));
            } else {
                output::info(&format!("Note has no tag '{}'.", tag.trim()));
            }
        }
    }

    finish(&notebook).await
}
