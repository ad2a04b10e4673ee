//! `notevault prefs`: show or change notebook preferences.

use console::style;

use crate::cli::output;
use crate::cli::{open_notebook, Cli};
use crate::config::Preferences;
use crate::errors::Result;

/// Execute the `prefs` command.
///
/// Out-of-range values are clamped, not rejected.  Preferences live
/// outside the vault, so no password is needed.
pub async fn execute(cli: &Cli, snap_mins: Option<u32>, auto_lock_mins: Option<u32>) -> Result<()> {
    let notebook = open_notebook(cli, false).await?;
    let current = notebook.preferences();

    if snap_mins.is_some() || auto_lock_mins.is_some() {
        let updated = Preferences {
            snap_mins: snap_mins.unwrap_or(current.snap_mins),
            auto_lock_mins: auto_lock_mins.unwrap_or(current.auto_lock_mins),
        };
        notebook.set_preferences(updated)?;
        output::success("Preferences saved.");
    }

    let prefs = notebook.preferences();
    println!(
        "{} {} min",
        style("Snapshot interval:").bold(),
        prefs.snap_mins
    );
    println!(
        "{} {} min",
        style("Auto-lock after:").bold(),
        prefs.auto_lock_mins
    );
    Ok(())
}
