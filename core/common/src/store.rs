//! 永続ストア
//!
//! KV ストレージの `dreams`（エントリ配列）と `settings`（設定）の 2 キーを持つ。
//! エントリの保存順が一覧の順（新しく作ったものが先頭）。
//! ストレージの失敗は StorageUnavailable のまま呼び出し側へ返す。

use crate::domain::{DreamEntry, EntryId, Settings, SettingsPatch};
use crate::error::Error;
use crate::ports::outbound::{Clock, KeyValueStorage, Log, LogLevel, LogRecord};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;

pub const DREAMS_KEY: &str = "dreams";
pub const SETTINGS_KEY: &str = "settings";

/// インポートで置き換えたもの
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    /// 置き換えたエントリ数（エントリを含まないデータなら None）
    pub entries: Option<usize>,
    pub settings: bool,
}

pub struct DreamStore {
    storage: Arc<dyn KeyValueStorage>,
    clock: Arc<dyn Clock>,
    log: Arc<dyn Log>,
}

impl DreamStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, clock: Arc<dyn Clock>, log: Arc<dyn Log>) -> Self {
        Self { storage, clock, log }
    }

    fn trace(&self, message: &str, key: &str, count: Option<usize>) {
        let mut rec = LogRecord::new(LogLevel::Debug, message)
            .layer("store")
            .kind("storage")
            .field("key", key);
        if let Some(n) = count {
            rec = rec.field("count", n);
        }
        let _ = self.log.log(&rec);
    }

    /// 全エントリ（保存順）
    pub fn list_entries(&self) -> Result<Vec<DreamEntry>, Error> {
        let entries = match self.storage.get(DREAMS_KEY)? {
            None | Some(Value::Null) => Vec::new(),
            Some(v) => serde_json::from_value::<Vec<DreamEntry>>(v)
                .map_err(|e| Error::parse(format!("保存データの形式が不正です: {}", e)))?,
        };
        self.trace("entries loaded", DREAMS_KEY, Some(entries.len()));
        Ok(entries)
    }

    pub fn get_entry(&self, id: &EntryId) -> Result<Option<DreamEntry>, Error> {
        Ok(self.list_entries()?.into_iter().find(|e| &e.id == id))
    }

    /// 同じ ID があれば置き換え（updatedAt を現在時刻に）、無ければ先頭に追加
    ///
    /// 実際に保存した内容を返す。
    pub fn save_entry(&self, entry: &DreamEntry) -> Result<DreamEntry, Error> {
        let mut entries = self.list_entries()?;
        let saved = match entries.iter().position(|e| e.id == entry.id) {
            Some(idx) => {
                let mut updated = entry.clone();
                updated.updated_at = self.clock.now_ms();
                entries[idx] = updated.clone();
                updated
            }
            None => {
                entries.insert(0, entry.clone());
                entry.clone()
            }
        };
        self.write_entries(&entries)?;
        Ok(saved)
    }

    /// 削除（存在しない ID は何もしない）。削除したかを返す
    pub fn delete_entry(&self, id: &EntryId) -> Result<bool, Error> {
        let mut entries = self.list_entries()?;
        let before = entries.len();
        entries.retain(|e| &e.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.write_entries(&entries)?;
        Ok(true)
    }

    fn write_entries(&self, entries: &[DreamEntry]) -> Result<(), Error> {
        let value = serde_json::to_value(entries).map_err(|e| Error::parse(e.to_string()))?;
        self.storage.set(DREAMS_KEY, &value)?;
        self.trace("entries written", DREAMS_KEY, Some(entries.len()));
        Ok(())
    }

    /// 保存済みの設定を既定値に重ねたもの
    ///
    /// 読めない値（新しい版が書いた未知のプロバイダ名など）はその項目だけ既定値に戻す。
    pub fn get_settings(&self) -> Result<Settings, Error> {
        let stored = self.storage.get(SETTINGS_KEY)?;
        self.trace("settings loaded", SETTINGS_KEY, None);
        let (settings, rejected) = settings_over_defaults(stored)?;
        if !rejected.is_empty() {
            let _ = self.log.log(
                &LogRecord::new(LogLevel::Warn, "settings fields reset to defaults")
                    .layer("store")
                    .kind("storage")
                    .field("fields", rejected.join(",")),
            );
        }
        Ok(settings)
    }

    /// 部分更新を保存済みの設定へマージして保存する
    pub fn save_settings(&self, patch: &SettingsPatch) -> Result<Settings, Error> {
        let mut settings = self.get_settings()?;
        patch.apply_to(&mut settings);
        self.write_settings(&settings)?;
        Ok(settings)
    }

    fn write_settings(&self, settings: &Settings) -> Result<(), Error> {
        let value = serde_json::to_value(settings).map_err(|e| Error::parse(e.to_string()))?;
        self.storage.set(SETTINGS_KEY, &value)?;
        self.trace("settings written", SETTINGS_KEY, None);
        Ok(())
    }

    /// `{ entries, settings, exportedAt }` の整形 JSON
    pub fn export_all(&self) -> Result<String, Error> {
        let entries = self.list_entries()?;
        let settings = self.get_settings()?;
        let exported_at = chrono::DateTime::from_timestamp_millis(self.clock.now_ms())
            .unwrap_or_default()
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let doc = json!({
            "entries": entries,
            "settings": settings,
            "exportedAt": exported_at,
        });
        serde_json::to_string_pretty(&doc).map_err(|e| Error::parse(e.to_string()))
    }

    /// エクスポート形式の JSON を取り込む
    ///
    /// 全体を解析・検証してから書き込む。`entries` / `settings` が無い（または null の）
    /// 側は保存済みのまま。旧形式の `dreams` キーも `entries` として受け付ける。
    pub fn import_all(&self, text: &str) -> Result<ImportSummary, Error> {
        let doc: Value = serde_json::from_str(text)
            .map_err(|e| Error::parse(format!("インポートデータの解析に失敗しました: {}", e)))?;
        let obj = doc
            .as_object()
            .ok_or_else(|| Error::parse("インポートデータがオブジェクトではありません"))?;

        let entries = match obj.get("entries").or_else(|| obj.get("dreams")) {
            None | Some(Value::Null) => None,
            Some(v) => {
                let list = serde_json::from_value::<Vec<DreamEntry>>(v.clone())
                    .map_err(|e| Error::parse(format!("エントリの形式が不正です: {}", e)))?;
                ensure_unique_ids(&list)?;
                Some(list)
            }
        };
        let settings = match obj.get("settings") {
            None | Some(Value::Null) => None,
            Some(v) => {
                let (s, rejected) = settings_over_defaults(Some(v.clone()))?;
                if !rejected.is_empty() {
                    return Err(Error::parse(format!(
                        "設定の形式が不正です: {}",
                        rejected.join(", ")
                    )));
                }
                Some(s)
            }
        };

        if let Some(ref list) = entries {
            self.write_entries(list)?;
        }
        if let Some(ref s) = settings {
            self.write_settings(s)?;
        }
        Ok(ImportSummary {
            entries: entries.map(|l| l.len()),
            settings: settings.is_some(),
        })
    }

    /// 全キーを消す
    pub fn clear_all(&self) -> Result<(), Error> {
        self.storage.clear()?;
        let _ = self
            .log
            .log(&LogRecord::new(LogLevel::Info, "storage cleared").layer("store").kind("storage"));
        Ok(())
    }
}

/// インポートするエントリの ID が重複していないか
fn ensure_unique_ids(entries: &[DreamEntry]) -> Result<(), Error> {
    let mut seen = HashSet::new();
    match entries.iter().find(|e| !seen.insert(&e.id)) {
        Some(dup) => Err(Error::parse(format!("エントリのIDが重複しています: {}", dup.id))),
        None => Ok(()),
    }
}

/// 部分的な設定レコードを既定値に重ねる（未知のキーは無視）
///
/// 項目ごとに重ね、読めなかった項目は既定値のまま名前を返す。
fn settings_over_defaults(stored: Option<Value>) -> Result<(Settings, Vec<String>), Error> {
    let mut settings = Settings::default();
    let mut rejected = Vec::new();
    let fields = match stored {
        None | Some(Value::Null) => return Ok((settings, rejected)),
        Some(Value::Object(fields)) => fields,
        Some(_) => return Err(Error::parse("設定の形式が不正です")),
    };
    let mut merged = serde_json::to_value(&settings).map_err(|e| Error::parse(e.to_string()))?;
    for (k, v) in fields {
        if v.is_null() {
            continue;
        }
        let mut candidate = merged.clone();
        if let Some(obj) = candidate.as_object_mut() {
            obj.insert(k.clone(), v);
        }
        match serde_json::from_value::<Settings>(candidate.clone()) {
            Ok(s) => {
                settings = s;
                merged = candidate;
            }
            Err(_) => rejected.push(k),
        }
    }
    Ok((settings, rejected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{MemoryKeyValueStorage, NoopLog};
    use crate::domain::{DreamTag, TextProvider, Theme};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct StepClock(AtomicI64);

    impl Clock for StepClock {
        fn now_ms(&self) -> i64 {
            self.0.fetch_add(1, Ordering::SeqCst)
        }
    }

    fn store() -> (DreamStore, Arc<MemoryKeyValueStorage>) {
        let kv = Arc::new(MemoryKeyValueStorage::new());
        let s = DreamStore::new(kv.clone(), Arc::new(StepClock(AtomicI64::new(1_000))), Arc::new(NoopLog));
        (s, kv)
    }

    fn entry(id: &str, content: &str) -> DreamEntry {
        DreamEntry::new(
            EntryId::new(id),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            content,
            vec![DreamTag::Fun],
            10,
        )
    }

    #[test]
    fn test_empty_store() {
        let (s, _) = store();
        assert!(s.list_entries().unwrap().is_empty());
        assert_eq!(s.get_settings().unwrap(), Settings::default());
    }

    #[test]
    fn test_new_entries_go_to_front() {
        let (s, _) = store();
        s.save_entry(&entry("a", "1")).unwrap();
        s.save_entry(&entry("b", "2")).unwrap();
        let ids: Vec<String> = s.list_entries().unwrap().iter().map(|e| e.id.to_string()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_save_existing_replaces_in_place_and_stamps() {
        let (s, _) = store();
        s.save_entry(&entry("a", "1")).unwrap();
        s.save_entry(&entry("b", "2")).unwrap();
        let mut edited = entry("a", "書き直し");
        edited.updated_at = 0;
        let saved = s.save_entry(&edited).unwrap();
        assert!(saved.updated_at >= 1_000);
        let list = s.list_entries().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[1].id.as_str(), "a");
        assert_eq!(list[1].content, "書き直し");
    }

    #[test]
    fn test_save_twice_is_idempotent_except_updated_at() {
        let (s, _) = store();
        let e = entry("a", "同じ");
        s.save_entry(&e).unwrap();
        s.save_entry(&e).unwrap();
        let list = s.list_entries().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].content, "同じ");
        assert_eq!(list[0].created_at, e.created_at);
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let (s, _) = store();
        s.save_entry(&entry("a", "1")).unwrap();
        assert!(!s.delete_entry(&EntryId::new("zzz")).unwrap());
        assert!(s.delete_entry(&EntryId::new("a")).unwrap());
        assert!(s.list_entries().unwrap().is_empty());
    }

    #[test]
    fn test_settings_patch_merges() {
        let (s, _) = store();
        s.save_settings(&SettingsPatch {
            text_api_key: Some("key-1".to_string()),
            ..Default::default()
        })
        .unwrap();
        let after = s
            .save_settings(&SettingsPatch {
                theme: Some(Theme::Dark),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(after.text_api_key, "key-1");
        assert_eq!(after.theme, Theme::Dark);
        assert_eq!(s.get_settings().unwrap(), after);
    }

    #[test]
    fn test_partial_stored_settings_fill_defaults() {
        let (s, kv) = store();
        kv.set(SETTINGS_KEY, &json!({"textApiProvider": "gemini", "legacy": 1})).unwrap();
        let got = s.get_settings().unwrap();
        assert_eq!(got.text_api_provider, TextProvider::Gemini);
        assert_eq!(got.text_model, "gpt-4.1-mini");
    }

    #[test]
    fn test_export_import_round_trip() {
        let (s, _) = store();
        s.save_entry(&entry("a", "海")).unwrap();
        s.save_entry(&entry("b", "山")).unwrap();
        s.save_settings(&SettingsPatch {
            image_api_key: Some("img".to_string()),
            ..Default::default()
        })
        .unwrap();
        let exported = s.export_all().unwrap();
        let doc: Value = serde_json::from_str(&exported).unwrap();
        assert!(doc["exportedAt"].is_string());
        assert_eq!(doc["entries"].as_array().unwrap().len(), 2);

        let before = s.list_entries().unwrap();
        let settings = s.get_settings().unwrap();
        s.clear_all().unwrap();
        assert!(s.list_entries().unwrap().is_empty());

        let summary = s.import_all(&exported).unwrap();
        assert_eq!(summary, ImportSummary { entries: Some(2), settings: true });
        assert_eq!(s.list_entries().unwrap(), before);
        assert_eq!(s.get_settings().unwrap(), settings);
    }

    #[test]
    fn test_import_accepts_dreams_alias_and_keeps_missing_side() {
        let (s, _) = store();
        s.save_settings(&SettingsPatch {
            theme: Some(Theme::Light),
            ..Default::default()
        })
        .unwrap();
        let text = r#"{"dreams":[{"id":"x","date":"2025-05-05","content":"古い","tags":["怖い"],"createdAt":1,"updatedAt":1}]}"#;
        let summary = s.import_all(text).unwrap();
        assert_eq!(summary.entries, Some(1));
        assert!(!summary.settings);
        assert_eq!(s.get_settings().unwrap().theme, Theme::Light);
        assert_eq!(s.list_entries().unwrap()[0].tags, vec![DreamTag::Scary]);
    }

    #[test]
    fn test_import_validates_before_writing() {
        let (s, _) = store();
        s.save_entry(&entry("keep", "残る")).unwrap();
        // エントリは正しいが設定が壊れている
        let text = r#"{"entries":[],"settings":{"theme":"neon"}}"#;
        let err = s.import_all(text).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert_eq!(s.list_entries().unwrap().len(), 1);

        assert!(matches!(s.import_all("not json").unwrap_err(), Error::Parse(_)));
        assert!(matches!(s.import_all("[1,2]").unwrap_err(), Error::Parse(_)));
    }

    #[test]
    fn test_import_rejects_duplicate_ids() {
        let (s, _) = store();
        s.save_entry(&entry("keep", "残る")).unwrap();
        let dup = serde_json::to_value(entry("x", "一つ目")).unwrap();
        let second = entry("x", "二つ目");
        let text = json!({ "entries": [dup, second] }).to_string();

        let err = s.import_all(&text).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("x"));
        let ids: Vec<_> = s.list_entries().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![EntryId::new("keep")]);
    }

    #[test]
    fn test_unreadable_stored_field_falls_back_to_default() {
        let (s, kv) = store();
        kv.set(
            SETTINGS_KEY,
            &json!({"textApiProvider": "mistral", "theme": "dark", "textApiKey": "sk-kept"}),
        )
        .unwrap();
        let got = s.get_settings().unwrap();
        assert_eq!(got.text_api_provider, TextProvider::OpenAi);
        assert_eq!(got.theme, Theme::Dark);
        assert_eq!(got.text_api_key, "sk-kept");

        let saved = s
            .save_settings(&SettingsPatch {
                theme: Some(Theme::Light),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(saved.theme, Theme::Light);
        assert_eq!(saved.text_api_key, "sk-kept");
    }

    #[test]
    fn test_storage_failure_surfaces_as_unavailable() {
        let (s, kv) = store();
        kv.set_unavailable(true);
        assert!(matches!(s.list_entries().unwrap_err(), Error::StorageUnavailable(_)));
        assert!(matches!(
            s.save_entry(&entry("a", "x")).unwrap_err(),
            Error::StorageUnavailable(_)
        ));
    }
}
