//! Configuration: project settings from `.notevault.toml` and user
//! preferences from the store.

pub mod prefs;
pub mod settings;

pub use prefs::Preferences;
pub use settings::Settings;
