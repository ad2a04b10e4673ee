//! `notevault list`: display notes in a table.

use crate::cli::output;
use crate::cli::{open_notebook, Cli};
use crate::errors::Result;
use crate::store::{Filter, Note};

/// Execute the `list` command.
///
/// Filtering happens on a copy, so the stored view settings are left alone.
pub async fn execute(cli: &Cli, pinned: bool, recent: bool, query: Option<&str>) -> Result<()> {
    let notebook = open_notebook(cli, true).await?;

    let mut state = notebook.snapshot()?;
    state.filter = if pinned {
        Filter::Pinned
    } else if recent {
        Filter::Recent
    } else {
        Filter::All
    };
    state.query = query.unwrap_or_default().to_string();

    let notes: Vec<Note> = state
        .visible_notes(chrono::Utc::now())
        .into_iter()
        .cloned()
        .collect();
    output::info(&format!("{} note(s)", notes.len()));
    output::print_notes_table(&notes);

    Ok(())
}
