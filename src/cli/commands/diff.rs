//! `notevault diff`: compare a snapshot with the current text.
//!
//! Usage:
//!   notevault diff 3f2a 0     # oldest snapshot vs now

use crate::cli::output;
use crate::cli::{open_notebook, resolve_note_id, Cli};
use crate::errors::Result;

/// Execute the `diff` command.
pub async fn execute(cli: &Cli, id: &str, index: usize) -> Result<()> {
    let notebook = open_notebook(cli, true).await?;
    let id = resolve_note_id(&notebook, id)?;

    let diff = notebook.diff_snapshot(&id, index)?;
    output::print_content_diff(&diff);
    Ok(())
}
