//! File-backed key-value slot
//!
//! One JSON file per key inside a data directory. Writes go to a temp file
//! first and are renamed into place, so a reader never sees half a value.

use crate::error::StoreError;
use crate::slot::KeyValueSlot;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File-based implementation of KeyValueSlot.
#[derive(Debug, Clone)]
pub struct FileSlot {
    base_dir: PathBuf,
}

impl FileSlot {
    /// Create a new file slot rooted at `base_dir`, creating it if needed.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(|e| {
            StoreError::unavailable(format!("cannot create {}: {}", base_dir.display(), e))
        })?;
        Ok(Self { base_dir })
    }

    /// Directory holding the slot files
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the path to a key's file.
    fn value_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.base_dir.join(format!("{}.json", key)))
    }
}

impl KeyValueSlot for FileSlot {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.value_path(key)?;

        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::unavailable(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.value_path(key)?;
        let temp_path = path.with_extension("json.tmp");

        fs::write(&temp_path, value).map_err(|e| {
            StoreError::unavailable(format!("cannot write {}: {}", temp_path.display(), e))
        })?;
        fs::rename(&temp_path, &path).map_err(|e| {
            StoreError::unavailable(format!("cannot replace {}: {}", path.display(), e))
        })?;

        tracing::debug!(path = %path.display(), bytes = value.len(), "Wrote slot");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.value_path(key)?;

        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Deleted slot");
                Ok(())
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::unavailable(format!(
                "cannot delete {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_and_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let slot = FileSlot::new(dir.path()).unwrap();
        assert_eq!(slot.get("reservations").unwrap(), None);
        slot.put("reservations", "[1,2,3]").unwrap();

        let reopened = FileSlot::new(dir.path()).unwrap();
        assert_eq!(reopened.get("reservations").unwrap().as_deref(), Some("[1,2,3]"));
        assert!(dir.path().join("reservations.json").exists());
        assert!(!dir.path().join("reservations.json.tmp").exists());
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path()).unwrap();

        slot.put("k", "v").unwrap();
        slot.delete("k").unwrap();
        slot.delete("k").unwrap();
        assert_eq!(slot.get("k").unwrap(), None);
    }

    #[test]
    fn test_creates_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let slot = FileSlot::new(&nested).unwrap();
        slot.put("k", "v").unwrap();
        assert!(nested.join("k.json").exists());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::new(dir.path()).unwrap();

        for key in ["", "../escape", "a/b", ".hidden"] {
            let err = slot.put(key, "v").unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey(_)), "key {:?}", key);
        }
    }
}
