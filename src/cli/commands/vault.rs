//! `notevault vault status|enable|wipe`: manage the encrypted vault.

use console::style;
use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{finish, open_notebook, prompt_new_password, Cli, VaultAction};
use crate::errors::{NoteVaultError, Result};
use crate::vault::LockState;

/// Execute a `vault` subcommand.
pub async fn execute(cli: &Cli, action: &VaultAction) -> Result<()> {
    match action {
        VaultAction::Status => status(cli).await,
        VaultAction::Enable => enable(cli).await,
        VaultAction::Wipe { force } => wipe(cli, *force).await,
    }
}

async fn status(cli: &Cli) -> Result<()> {
    let notebook = open_notebook(cli, false).await?;
    let state = notebook.lock_state();
    let label = match state {
        LockState::NoVault => style(state.label()).yellow(),
        LockState::Locked | LockState::Unlocked => style("enabled").green(),
    };
    println!("{} {}", style("Vault:").bold(), label);
    if state == LockState::NoVault {
        output::tip("Run `notevault vault enable` to encrypt your notes.");
    }
    Ok(())
}

async fn enable(cli: &Cli) -> Result<()> {
    let notebook = open_notebook(cli, false).await?;
    if notebook.lock_state() != LockState::NoVault {
        return Err(NoteVaultError::VaultAlreadyEnabled);
    }

    let password = prompt_new_password()?;
    notebook.enable_vault(&password).await?;
    finish(&notebook).await?;

    output::success("Vault enabled. Notes are now encrypted at rest.");
    output::tip("Set NOTEVAULT_PASSWORD to skip the password prompt in scripts.");
    Ok(())
}

async fn wipe(cli: &Cli, force: bool) -> Result<()> {
    let notebook = open_notebook(cli, false).await?;
    if notebook.lock_state() == LockState::NoVault {
        return Err(NoteVaultError::VaultNotEnabled);
    }

    // Unless --force is set, ask for confirmation before wiping.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt("Permanently delete the vault and every note in it?")
            .default(false)
            .interact()
            .map_err(|e| NoteVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    notebook.wipe_vault().await?;
    finish(&notebook).await?;

    output::success("Vault wiped. Starting over with a fresh notebook.");
    Ok(())
}
