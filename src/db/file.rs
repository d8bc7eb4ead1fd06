use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::StorageAdapter;
use crate::error::{AppError, AppResult};

/// File-backed storage: one `<key>.json` file per key under a data directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> AppResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(AppError::InvalidInput(format!(
                "Invalid storage key: {:?}",
                key
            )));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl StorageAdapter for FileStorage {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Persistence(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&self, key: &str, value: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.root)?;

        // Write to a sibling file first so a crash never leaves a torn snapshot
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| {
            AppError::Persistence(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(AppError::Persistence(format!(
                "Failed to replace {}: {}",
                path.display(),
                e
            )));
        }

        tracing::debug!(key = %key, bytes = value.len(), "Storage write completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.read("favorites").unwrap(), None);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        storage.write("watchlist", "[]").unwrap();
        assert_eq!(storage.read("watchlist").unwrap(), Some("[]".to_string()));
        assert!(dir.path().join("nested").join("watchlist.json").exists());
        assert!(!dir.path().join("nested").join("watchlist.json.tmp").exists());
    }

    #[test]
    fn test_write_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        storage.write("favorites", r#"[{"id":1,"title":"A"}]"#).unwrap();
        storage.write("favorites", "[]").unwrap();
        assert_eq!(storage.read("favorites").unwrap(), Some("[]".to_string()));
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());

        assert!(matches!(
            storage.write("../escape", "[]"),
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(storage.read(""), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_write_into_unwritable_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the data directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let storage = FileStorage::new(&blocker);
        assert!(matches!(
            storage.write("favorites", "[]"),
            Err(AppError::Persistence(_))
        ));
    }

    #[test]
    fn test_failed_replace_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        // A non-empty directory where the snapshot file should be
        let target = dir.path().join("favorites.json");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "x").unwrap();

        assert!(matches!(
            storage.write("favorites", "[]"),
            Err(AppError::Persistence(_))
        ));
        assert!(!dir.path().join("favorites.json.tmp").exists());
    }
}
