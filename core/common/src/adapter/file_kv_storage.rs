//! キーごとに 1 つの JSON ファイルを置く KeyValueStorage 実装
//!
//! `<storage_dir>/<key>.json` に値を書く。書き込みは一時ファイル + rename で行い、
//! 途中で落ちても前の値か新しい値のどちらかが残る。

use crate::error::Error;
use crate::ports::outbound::{FileSystem, KeyValueStorage};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const EXT: &str = "json";

/// ファイルベースの KeyValueStorage
pub struct FileKeyValueStorage {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl FileKeyValueStorage {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl AsRef<Path>) -> Self {
        Self {
            fs,
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, Error> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::storage(format!("Invalid storage key: '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.{}", key, EXT)))
    }
}

impl KeyValueStorage for FileKeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        let path = self.key_path(key)?;
        if !self.fs.exists(&path) {
            return Ok(None);
        }
        let content = self.fs.read_to_string(&path)?;
        let value = serde_json::from_str(&content).map_err(|e| {
            Error::parse(format!("保存データ '{}' を読み込めません: {}", path.display(), e))
        })?;
        Ok(Some(value))
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), Error> {
        let path = self.key_path(key)?;
        self.fs.create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(value).map_err(|e| Error::parse(e.to_string()))?;
        let tmp = path.with_extension(format!("{}.tmp", EXT));
        self.fs.write(&tmp, &json)?;
        self.fs.rename(&tmp, &path)
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        let path = self.key_path(key)?;
        if self.fs.exists(&path) {
            self.fs.remove_file(&path)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        if !self.fs.exists(&self.dir) {
            return Ok(());
        }
        for path in self.fs.read_dir(&self.dir)? {
            let is_value_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(&format!(".{}", EXT)) || n.ends_with(&format!(".{}.tmp", EXT)))
                .unwrap_or(false);
            if is_value_file {
                self.fs.remove_file(&path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::StdFileSystem;
    use serde_json::json;

    fn storage(dir: &Path) -> FileKeyValueStorage {
        FileKeyValueStorage::new(Arc::new(StdFileSystem), dir.join("storage"))
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(storage(dir.path()).get("dreams").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let kv = storage(dir.path());
        kv.set("settings", &json!({"theme": "dark"})).unwrap();
        assert_eq!(kv.get("settings").unwrap(), Some(json!({"theme": "dark"})));
        assert!(dir.path().join("storage").join("settings.json").exists());
        assert!(!dir.path().join("storage").join("settings.json.tmp").exists());
    }

    #[test]
    fn test_remove_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let kv = storage(dir.path());
        kv.set("dreams", &json!([])).unwrap();
        kv.set("settings", &json!({})).unwrap();
        kv.remove("dreams").unwrap();
        kv.remove("dreams").unwrap();
        assert_eq!(kv.get("dreams").unwrap(), None);
        kv.clear().unwrap();
        assert_eq!(kv.get("settings").unwrap(), None);
    }

    #[test]
    fn test_clear_on_missing_dir_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        assert!(storage(dir.path()).clear().is_ok());
    }

    #[test]
    fn test_invalid_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = storage(dir.path()).set("../escape", &json!(1)).unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable(_)));
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let kv = storage(dir.path());
        std::fs::create_dir_all(dir.path().join("storage")).unwrap();
        std::fs::write(dir.path().join("storage").join("dreams.json"), "{not json").unwrap();
        assert!(matches!(kv.get("dreams").unwrap_err(), Error::Parse(_)));
    }
}
