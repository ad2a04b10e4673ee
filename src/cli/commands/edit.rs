//! `notevault edit`: change a note's title or body.
//!
//! With `--title` / `--body` the change is applied directly.  With
//! neither, the body is written to a temporary file, `$VISUAL` /
//! `$EDITOR` / `vi` is launched on it, and the saved file becomes the
//! new body.  The editor flow is refused while the vault is enabled,
//! since the temporary file would hold the note in the clear.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use zeroize::Zeroize;

use crate::cli::output;
use crate::cli::{finish, open_notebook, resolve_note_id, Cli};
use crate::errors::{NoteVaultError, Result};
use crate::store::{Content, NotePatch};
use crate::vault::LockState;

/// Execute the `edit` command.
pub async fn execute(
    cli: &Cli,
    id: &str,
    title: Option<&str>,
    body: Option<&str>,
) -> Result<()> {
    let notebook = open_notebook(cli, true).await?;
    let id = resolve_note_id(&notebook, id)?;

    let patch = if title.is_some() || body.is_some() {
        NotePatch {
            title: title.map(str::to_string),
            body: body.map(Content::new),
            ..NotePatch::default()
        }
    } else {
        if notebook.lock_state() != LockState::NoVault {
            return Err(NoteVaultError::CommandFailed(
                "the editor is unavailable while the vault is enabled; pass --title or --body"
                    .into(),
            ));
        }
        let note = notebook
            .note(&id)?
            .ok_or_else(|| NoteVaultError::NoteNotFound(id.clone()))?;
        match edit_in_editor(note.body.as_str())? {
            Some(edited) => NotePatch::body(edited),
            None => {
                output::info("No changes detected.");
                return Ok(());
            }
        }
    };

    notebook.update_note(&id, patch)?;
    finish(&notebook).await?;

    output::success(&format!("Updated note {}", output::short_id(&id)));
    Ok(())
}

/// Round-trip `body` through the user's editor.
///
/// Returns `None` when the file comes back unchanged.
fn edit_in_editor(body: &str) -> Result<Option<String>> {
    let tmp_path = write_temp_file(body)?;
    let editor = find_editor();

    let status = Command::new(&editor)
        .arg(&tmp_path)
        .status()
        .map_err(|e| NoteVaultError::EditorError(format!("failed to launch '{editor}': {e}")));

    let status = match status {
        Ok(status) => status,
        Err(e) => {
            secure_delete(&tmp_path);
            return Err(e);
        }
    };

    if !status.success() {
        secure_delete(&tmp_path);
        return Err(NoteVaultError::EditorError(format!(
            "editor exited with code {}",
            status.code().unwrap_or(-1)
        )));
    }

    let edited = fs::read_to_string(&tmp_path)
        .map_err(|e| NoteVaultError::EditorError(format!("failed to read edited file: {e}")));

    // Wipe and delete the temp file immediately.
    secure_delete(&tmp_path);

    let mut edited = edited?;
    let trimmed = edited.trim_end_matches('\n').to_string();
    edited.zeroize();

    if trimmed == body {
        Ok(None)
    } else {
        Ok(Some(trimmed))
    }
}

/// Write the body to an owner-only temp file and return its path.
fn write_temp_file(body: &str) -> Result<PathBuf> {
    let filename = format!(
        "notevault-edit-{}-{}.html",
        std::process::id(),
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)
    );
    let tmp_path = std::env::temp_dir().join(filename);

    // Create the file with restrictive permissions atomically (no TOCTOU race).
    #[cfg(unix)]
    let mut file = {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&tmp_path)
            .map_err(|e| NoteVaultError::EditorError(format!("failed to create temp file: {e}")))?
    };

    #[cfg(not(unix))]
    let mut file = fs::File::create(&tmp_path)
        .map_err(|e| NoteVaultError::EditorError(format!("failed to create temp file: {e}")))?;

    file.write_all(body.as_bytes())?;
    writeln!(file)?;
    file.flush()?;
    Ok(tmp_path)
}

/// Find the user's preferred editor.
fn find_editor() -> String {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|editor| !editor.is_empty())
        .unwrap_or_else(|| "vi".to_string())
}

/// Overwrite a file's contents with zeros before deleting it.
/// Best-effort: failures are silently ignored.
fn secure_delete(path: &Path) {
    if let Ok(metadata) = fs::metadata(path) {
        let len = metadata.len() as usize;
        if len > 0 {
            if let Ok(mut file) = fs::OpenOptions::new().write(true).open(path) {
                let _ = file.write_all(&vec![0u8; len]);
                let _ = file.flush();
            }
        }
    }
    let _ = fs::remove_file(path);
}
