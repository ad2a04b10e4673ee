//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::history::ContentDiff;
use crate::store::{Note, Snapshot};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// First eight characters of a note id, enough to address it.
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Print a table of notes (Id, Title, Tags, Updated).
pub fn print_notes_table(notes: &[Note]) {
    if notes.is_empty() {
        info("No notes match.");
        tip("Run `notevault new <TITLE>` to write one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Title", "Tags", "Updated"]);

    for n in notes {
        let title = if n.pinned {
            format!("\u{2605} {}", n.title)
        } else {
            n.title.clone()
        };
        table.add_row(vec![
            short_id(&n.id).to_string(),
            title,
            n.tags.join(", "),
            n.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print a note's snapshots, oldest first, with their indices.
pub fn print_history_table(history: &[Snapshot]) {
    if history.is_empty() {
        info("No snapshots yet.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Taken", "Title", "Chars"]);

    for (i, snap) in history.iter().enumerate() {
        table.add_row(vec![
            i.to_string(),
            snap.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            snap.title.clone(),
            snap.body.plain_text().chars().count().to_string(),
        ]);
    }

    println!("{table}");
}

/// Print added lines in green and removed lines in red.
pub fn print_content_diff(diff: &ContentDiff) {
    if diff.is_empty() {
        info("No differences.");
        return;
    }
    for line in &diff.added {
        println!("{} {}", style("+").green().bold(), style(line).green());
    }
    for line in &diff.removed {
        println!("{} {}", style("-").red().bold(), style(line).red());
    }
}
