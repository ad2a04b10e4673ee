//! `notevault new`: create a note.

use crate::cli::output;
use crate::cli::{finish, open_notebook, Cli};
use crate::errors::Result;
use crate::store::{Content, NoteInit};

/// Execute the `new` command.
pub async fn execute(cli: &Cli, title: &str, body: Option<&str>, tags: &[String]) -> Result<()> {
    let notebook = open_notebook(cli, true).await?;

    let init = NoteInit {
        title: Some(title.to_string()),
        body: Content::new(body.unwrap_or_default()),
        tags: tags.to_vec(),
        pinned: false,
    };
    let id = notebook.create_note(init)?;
    finish(&notebook).await?;

    output::success(&format!("Created note {}", output::short_id(&id)));
    println!("{id}");
    Ok(())
}
