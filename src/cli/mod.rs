//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{NoteVaultError, Result};
use crate::notebook::{BootOutcome, Notebook, NotebookOptions, PersistStatus};
use crate::storage::FileStore;
use crate::store::NoteId;
use crate::vault::LockState;

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// NoteVault CLI: local-first notes with an optional encrypted vault.
#[derive(Parser)]
#[command(
    name = "notevault",
    about = "Local-first notes with an optional encrypted vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (default: from .notevault.toml, else .notevault)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// List notes (pinned first, then most recently updated)
    List {
        /// Only pinned notes
        #[arg(long, conflicts_with = "recent")]
        pinned: bool,
        /// Only notes updated in the last 7 days
        #[arg(long)]
        recent: bool,
        /// Case-insensitive text to search for
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Create a note
    New {
        /// Note title
        title: String,
        /// Note body (markup allowed)
        #[arg(short, long)]
        body: Option<String>,
        /// Tag to attach (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Print a note as plain text
    Show {
        /// Note id (or unique prefix)
        id: String,
    },

    /// Change a note's title or body (opens an editor if neither is given)
    Edit {
        /// Note id (or unique prefix)
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New body
        #[arg(short, long)]
        body: Option<String>,
    },

    /// Delete a note
    Delete {
        /// Note id (or unique prefix)
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Copy a note under a new id
    Duplicate {
        /// Note id (or unique prefix)
        id: String,
    },

    /// Pin or unpin a note
    Pin {
        /// Note id (or unique prefix)
        id: String,
    },

    /// Add or remove tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// List a note's snapshots
    History {
        /// Note id (or unique prefix)
        id: String,
    },

    /// Compare a snapshot with the note's current text
    Diff {
        /// Note id (or unique prefix)
        id: String,
        /// Snapshot index as shown by `history`
        index: usize,
    },

    /// Restore a note from a snapshot
    Restore {
        /// Note id (or unique prefix)
        id: String,
        /// Snapshot index as shown by `history`
        index: usize,
    },

    /// Show or change the snapshot interval and auto-lock timeout
    Prefs {
        /// Minutes between history snapshots (1-10)
        #[arg(long)]
        snap_mins: Option<u32>,
        /// Minutes of inactivity before the vault locks itself (1-60)
        #[arg(long)]
        auto_lock_mins: Option<u32>,
    },

    /// Manage the encrypted vault
    Vault {
        #[command(subcommand)]
        action: VaultAction,
    },
}

/// Tag subcommands.
#[derive(clap::Subcommand)]
pub enum TagAction {
    /// Attach a tag to a note
    Add {
        /// Note id (or unique prefix)
        id: String,
        tag: String,
    },

    /// Detach a tag from a note
    Remove {
        /// Note id (or unique prefix)
        id: String,
        tag: String,
    },
}

/// Vault subcommands.
#[derive(clap::Subcommand)]
pub enum VaultAction {
    /// Show whether the vault is enabled
    Status,

    /// Encrypt all notes under a password
    Enable,

    /// Delete the vault and all notes in it, starting over
    Wipe {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the vault password, trying in order:
/// 1. `NOTEVAULT_PASSWORD` env var (scripts)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("NOTEVAULT_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter vault password")
        .interact()
        .map_err(|e| NoteVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (used by `vault enable`).
///
/// Also respects `NOTEVAULT_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("NOTEVAULT_PASSWORD") {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(NoteVaultError::InvalidPassword(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose vault password")
            .with_confirmation(
                "Confirm vault password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| NoteVaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Resolve the data directory from the CLI arguments and settings.
///
/// Example: `<cwd>/.notevault`
pub fn data_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match &cli.data_dir {
        Some(dir) => cwd.join(dir),
        None => settings.data_path(&cwd),
    })
}

/// Open the notebook for this invocation.
///
/// With `unlock`, a locked vault is unlocked with the password from
/// `prompt_password`; otherwise it is left as found.
pub async fn open_notebook(cli: &Cli, unlock: bool) -> Result<Notebook> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    let store = FileStore::open(&data_path(cli, &settings)?)?;

    let (notebook, outcome) = Notebook::open(Arc::new(store), NotebookOptions::from(&settings))?;
    match outcome {
        BootOutcome::Recovered { repairs } => {
            output::warning(&format!("Stored notes needed {repairs} repair(s)."));
        }
        BootOutcome::Reset => {
            output::warning("Stored notes were unreadable; starting with a fresh notebook.");
        }
        BootOutcome::Fresh | BootOutcome::Loaded | BootOutcome::Locked => {}
    }

    if unlock && notebook.lock_state() == LockState::Locked {
        let password = prompt_password()?;
        notebook.unlock(&password).await?;
    }

    Ok(notebook)
}

/// Save any pending changes before the process exits.
pub async fn finish(notebook: &Notebook) -> Result<()> {
    match notebook.flush().await {
        PersistStatus::Failed(failure) => Err(NoteVaultError::CommandFailed(format!(
            "changes were not saved ({failure})"
        ))),
        _ => Ok(()),
    }
}

/// Find the note whose id is `prefix` or starts with it.
pub fn resolve_note_id(notebook: &Notebook, prefix: &str) -> Result<NoteId> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(NoteVaultError::NoteNotFound(prefix.to_string()));
    }

    let state = notebook.snapshot()?;
    if state.contains(prefix) {
        return Ok(prefix.to_string());
    }

    let matches: Vec<&str> = state
        .notes
        .iter()
        .filter(|n| n.id.starts_with(prefix))
        .map(|n| n.id.as_str())
        .collect();

    match matches.as_slice() {
        [] => Err(NoteVaultError::NoteNotFound(prefix.to_string())),
        [id] => Ok((*id).to_string()),
        _ => Err(NoteVaultError::CommandFailed(format!(
            "'{prefix}' matches {} notes; use more characters",
            matches.len()
        ))),
    }
}
