//! One module per subcommand.  Each exposes an async `execute`.

pub mod delete;
pub mod diff;
pub mod duplicate;
pub mod edit;
pub mod history;
pub mod list;
pub mod new;
pub mod pin;
pub mod prefs;
pub mod restore;
pub mod show;
pub mod tag;
pub mod vault;
