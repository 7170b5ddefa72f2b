//! メモリ上の KeyValueStorage（テスト・一時利用向け）

use crate::error::Error;
use crate::ports::outbound::KeyValueStorage;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// メモリ上の KeyValueStorage
///
/// `set_unavailable(true)` で全操作を StorageUnavailable にでき、失敗時の振る舞いを確かめられる。
#[derive(Debug, Default)]
pub struct MemoryKeyValueStorage {
    values: Mutex<BTreeMap<String, Value>>,
    unavailable: AtomicBool,
}

impl MemoryKeyValueStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn values(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Value>>, Error> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::storage("ストレージにアクセスできません"));
        }
        self.values
            .lock()
            .map_err(|_| Error::storage("storage lock poisoned"))
    }
}

impl KeyValueStorage for MemoryKeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        Ok(self.values()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), Error> {
        self.values()?.insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.values()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        self.values()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_roundtrip_and_clear() {
        let kv = MemoryKeyValueStorage::new();
        kv.set("a", &json!(1)).unwrap();
        assert_eq!(kv.get("a").unwrap(), Some(json!(1)));
        kv.clear().unwrap();
        assert_eq!(kv.get("a").unwrap(), None);
    }

    #[test]
    fn test_unavailable() {
        let kv = MemoryKeyValueStorage::new();
        kv.set_unavailable(true);
        assert!(matches!(kv.get("a"), Err(Error::StorageUnavailable(_))));
        kv.set_unavailable(false);
        assert!(kv.get("a").is_ok());
    }
}
