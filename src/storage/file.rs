//! Directory-backed key/value store.
//!
//! Each key is one file, `<dir>/<key>.json`.  Writes go to a temp file in
//! the same directory and are renamed over the target, so readers never
//! see a half-written record.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::KvStore;
use crate::errors::{NoteVaultError, Result};

/// File-per-key storage rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            NoteVaultError::StorageUnavailable(format!(
                "cannot create data directory {}: {e}",
                dir.display()
            ))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(dir, fs::Permissions::from_mode(0o700));
        }

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn validate_key(key: &str) -> Result<()> {
        if key.is_empty()
            || !key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(NoteVaultError::StorageUnavailable(format!(
                "invalid storage key '{key}'"
            )));
        }
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Self::validate_key(key)?;
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(NoteVaultError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        Self::validate_key(key)?;
        let path = self.path_for(key);
        let tmp_path = self.dir.join(format!(".{key}.json.tmp"));

        let unavailable =
            |e: std::io::Error| NoteVaultError::StorageUnavailable(format!("{key}: {e}"));

        fs::write(&tmp_path, value).map_err(unavailable)?;

        // Owner-only: these files hold note content or ciphertext.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600));
        }

        fs::rename(&tmp_path, &path).map_err(unavailable)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        Self::validate_key(key)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NoteVaultError::StorageUnavailable(format!("{key}: {e}"))),
        }
    }
}
