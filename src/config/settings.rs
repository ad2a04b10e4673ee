use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::{Pbkdf2Params, DEFAULT_ITERATIONS, MAX_ITERATIONS, MIN_ITERATIONS};
use crate::errors::{NoteVaultError, Result};

/// Project-level configuration, loaded from `.notevault.toml`.
///
/// Every field has a sensible default so NoteVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to the project root) holding the stored records.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Quiet period before a scheduled save runs, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// PBKDF2 iteration count used when sealing the vault.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// How often the auto-lock ticker checks for inactivity, in seconds.
    #[serde(default = "default_auto_lock_check_secs")]
    pub auto_lock_check_secs: u64,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_data_dir() -> String {
    ".notevault".to_string()
}

fn default_debounce_ms() -> u64 {
    450
}

fn default_kdf_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_auto_lock_check_secs() -> u64 {
    30
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            debounce_ms: default_debounce_ms(),
            kdf_iterations: default_kdf_iterations(),
            auto_lock_check_secs: default_auto_lock_check_secs(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".notevault.toml";

    /// Load settings from `<project_dir>/.notevault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, or asks for a KDF
    /// iteration count the crypto layer does not accept, an error is
    /// returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            NoteVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if !(MIN_ITERATIONS..=MAX_ITERATIONS).contains(&settings.kdf_iterations) {
            return Err(NoteVaultError::ConfigError(format!(
                "kdf_iterations must be between {MIN_ITERATIONS} and {MAX_ITERATIONS} (got {})",
                settings.kdf_iterations
            )));
        }

        tracing::debug!(path = %config_path.display(), "loaded settings");
        Ok(settings)
    }

    /// Full path of the data directory.
    ///
    /// Example: `project_dir/.notevault`
    pub fn data_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.data_dir)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn auto_lock_check(&self) -> Duration {
        Duration::from_secs(self.auto_lock_check_secs.max(1))
    }

    /// Convert the KDF settings into crypto-layer params.
    pub fn kdf_params(&self) -> Pbkdf2Params {
        Pbkdf2Params {
            iterations: self.kdf_iterations,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.data_dir, ".notevault");
        assert_eq!(s.debounce(), Duration::from_millis(450));
        assert_eq!(s.kdf_iterations, 120_000);
        assert_eq!(s.auto_lock_check(), Duration::from_secs(30));
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.data_dir, ".notevault");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
data_dir = "notes"
debounce_ms = 200
kdf_iterations = 5000
auto_lock_check_secs = 5
"#;
        fs::write(tmp.path().join(".notevault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.data_dir, "notes");
        assert_eq!(settings.debounce_ms, 200);
        assert_eq!(settings.kdf_params(), Pbkdf2Params { iterations: 5_000 });
        assert_eq!(settings.auto_lock_check_secs, 5);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".notevault.toml"), "debounce_ms = 1000\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.debounce_ms, 1000);
        // Rest should be defaults
        assert_eq!(settings.data_dir, ".notevault");
        assert_eq!(settings.kdf_iterations, 120_000);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".notevault.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(NoteVaultError::ConfigError(_))));
    }

    #[test]
    fn load_rejects_out_of_range_kdf() {
        let tmp = TempDir::new().unwrap();
        for value in ["10", "4000000000"] {
            fs::write(
                tmp.path().join(".notevault.toml"),
                format!("kdf_iterations = {value}\n"),
            )
            .unwrap();
            assert!(matches!(
                Settings::load(tmp.path()),
                Err(NoteVaultError::ConfigError(_))
            ));
        }
    }

    #[test]
    fn data_path_respects_custom_dir() {
        let s = Settings {
            data_dir: "vault-data".to_string(),
            ..Settings::default()
        };
        let project = Path::new("/home/user/notes");
        assert_eq!(
            s.data_path(project),
            PathBuf::from("/home/user/notes/vault-data")
        );
    }
}
