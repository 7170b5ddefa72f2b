//! アプリケーション状態
//!
//! ストアへの書き込みが成功したときだけキャッシュを更新する（write-through）。
//! 失敗時はキャッシュをそのままにして利用者向けのエラーメッセージを立てる。
//! 状態が変わるたびに購読者へ `StateChange` を通知する。

use crate::domain::{DreamEntry, EntryId, Settings, SettingsPatch, Theme};
use crate::error::Error;
use crate::search::EntryFilter;
use crate::stats::{compute_stats, DreamStats};
use crate::store::DreamStore;
use std::sync::Arc;

pub const LOAD_FAILED: &str = "データの読み込みに失敗しました";
pub const SAVE_FAILED: &str = "夢の保存に失敗しました";
pub const UPDATE_FAILED: &str = "夢の更新に失敗しました";
pub const DELETE_FAILED: &str = "夢の削除に失敗しました";
pub const SETTINGS_FAILED: &str = "設定の保存に失敗しました";

/// 表示中の画面
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Home,
    List,
    Stats,
    Settings,
}

impl View {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "home" => Some(Self::Home),
            "list" => Some(Self::List),
            "stats" => Some(Self::Stats),
            "settings" => Some(Self::Settings),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::List => "list",
            Self::Stats => "stats",
            Self::Settings => "settings",
        }
    }
}

/// 購読者に渡す変更内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    Loading(bool),
    Loaded,
    EntryAdded(EntryId),
    EntryUpdated(EntryId),
    EntryDeleted(EntryId),
    SettingsUpdated,
    ViewChanged(View),
    ErrorChanged(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StateChange) + Send>;

pub struct AppState {
    store: Arc<DreamStore>,
    entries: Vec<DreamEntry>,
    settings: Settings,
    view: View,
    loading: bool,
    error: Option<String>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl AppState {
    /// 読み込み前の状態（既定の設定・空の一覧・読み込み中）
    pub fn new(store: Arc<DreamStore>) -> Self {
        Self {
            store,
            entries: Vec::new(),
            settings: Settings::default(),
            view: View::default(),
            loading: true,
            error: None,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn entries(&self) -> &[DreamEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &EntryId) -> Option<&DreamEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StateChange) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// 解除できたか（未登録の ID なら false）
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, change: StateChange) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
    }

    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.notify(StateChange::Loading(loading));
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error.clone();
        self.notify(StateChange::ErrorChanged(error));
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
        self.notify(StateChange::ViewChanged(view));
    }

    fn fail<T>(&mut self, message: &str, err: Error) -> Result<T, Error> {
        self.set_error(Some(message.to_string()));
        Err(err)
    }

    /// エントリと設定をストアから読み込む
    pub fn initialize(&mut self) -> Result<(), Error> {
        self.set_loading(true);
        if self.error.is_some() {
            self.set_error(None);
        }
        let loaded = self
            .store
            .list_entries()
            .and_then(|entries| Ok((entries, self.store.get_settings()?)));
        match loaded {
            Ok((entries, settings)) => {
                self.entries = entries;
                self.settings = settings;
                self.set_loading(false);
                self.notify(StateChange::Loaded);
                Ok(())
            }
            Err(e) => {
                self.set_loading(false);
                self.fail(LOAD_FAILED, e)
            }
        }
    }

    /// 保存済みの内容をキャッシュへ反映する（ストアと同じく既存なら同じ位置、無ければ先頭）
    ///
    /// 先頭に加えたなら true。
    fn place(&mut self, saved: &DreamEntry) -> bool {
        match self.entries.iter_mut().find(|e| e.id == saved.id) {
            Some(slot) => {
                *slot = saved.clone();
                false
            }
            None => {
                self.entries.insert(0, saved.clone());
                true
            }
        }
    }

    /// 新しいエントリを保存して一覧の先頭に加える（同じ ID があればその位置で置き換える）
    pub fn add_entry(&mut self, entry: DreamEntry) -> Result<DreamEntry, Error> {
        match self.store.save_entry(&entry) {
            Ok(saved) => {
                let change = if self.place(&saved) {
                    StateChange::EntryAdded(saved.id.clone())
                } else {
                    StateChange::EntryUpdated(saved.id.clone())
                };
                self.notify(change);
                Ok(saved)
            }
            Err(e) => self.fail(SAVE_FAILED, e),
        }
    }

    /// 既存エントリを保存してキャッシュの同じ位置を置き換える
    pub fn update_entry(&mut self, entry: DreamEntry) -> Result<DreamEntry, Error> {
        match self.store.save_entry(&entry) {
            Ok(saved) => {
                self.place(&saved);
                self.notify(StateChange::EntryUpdated(saved.id.clone()));
                Ok(saved)
            }
            Err(e) => self.fail(UPDATE_FAILED, e),
        }
    }

    pub fn delete_entry(&mut self, id: &EntryId) -> Result<bool, Error> {
        match self.store.delete_entry(id) {
            Ok(removed) => {
                self.entries.retain(|e| &e.id != id);
                if removed {
                    self.notify(StateChange::EntryDeleted(id.clone()));
                }
                Ok(removed)
            }
            Err(e) => self.fail(DELETE_FAILED, e),
        }
    }

    pub fn update_settings(&mut self, patch: &SettingsPatch) -> Result<Settings, Error> {
        match self.store.save_settings(patch) {
            Ok(saved) => {
                self.settings = saved.clone();
                self.notify(StateChange::SettingsUpdated);
                Ok(saved)
            }
            Err(e) => self.fail(SETTINGS_FAILED, e),
        }
    }

    /// キャッシュから集計し直す
    pub fn stats(&self) -> DreamStats {
        compute_stats(&self.entries)
    }

    pub fn filtered(&self, filter: &EntryFilter) -> Vec<&DreamEntry> {
        filter.apply(&self.entries)
    }

    pub fn effective_theme(&self, system_prefers_dark: bool) -> Theme {
        self.settings.theme.resolve(system_prefers_dark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{MemoryKeyValueStorage, NoopLog};
    use crate::domain::DreamTag;
    use crate::ports::outbound::Clock;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now_ms(&self) -> i64 {
            42
        }
    }

    fn state() -> (AppState, Arc<MemoryKeyValueStorage>) {
        let kv = Arc::new(MemoryKeyValueStorage::new());
        let store = Arc::new(DreamStore::new(kv.clone(), Arc::new(FixedClock), Arc::new(NoopLog)));
        (AppState::new(store), kv)
    }

    fn entry(id: &str) -> DreamEntry {
        DreamEntry::new(
            EntryId::new(id),
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            "本文",
            vec![DreamTag::Fun],
            1,
        )
    }

    #[test]
    fn test_initialize_loads_defaults() {
        let (mut s, _) = state();
        assert!(s.is_loading());
        s.initialize().unwrap();
        assert!(!s.is_loading());
        assert!(s.entries().is_empty());
        assert_eq!(s.settings(), &Settings::default());
        assert_eq!(s.view(), View::Home);
    }

    #[test]
    fn test_initialize_failure_sets_message() {
        let (mut s, kv) = state();
        kv.set_unavailable(true);
        assert!(s.initialize().is_err());
        assert_eq!(s.error(), Some(LOAD_FAILED));
        assert!(!s.is_loading());
    }

    #[test]
    fn test_write_through_add_update_delete() {
        let (mut s, _) = state();
        s.initialize().unwrap();
        s.add_entry(entry("a")).unwrap();
        s.add_entry(entry("b")).unwrap();
        assert_eq!(s.entries()[0].id.as_str(), "b");

        let mut edited = entry("a");
        edited.content = "追記".to_string();
        let saved = s.update_entry(edited).unwrap();
        assert_eq!(saved.updated_at, 42);
        assert_eq!(s.entries()[1].content, "追記");

        assert!(s.delete_entry(&EntryId::new("b")).unwrap());
        assert_eq!(s.entries().len(), 1);
        assert_eq!(s.store.list_entries().unwrap(), s.entries().to_vec());
    }

    #[test]
    fn test_re_adding_existing_id_keeps_store_order() {
        let (mut s, _) = state();
        s.initialize().unwrap();
        s.add_entry(entry("a")).unwrap();
        s.add_entry(entry("b")).unwrap();
        let mut again = entry("a");
        again.content = "書き直し".to_string();
        s.add_entry(again).unwrap();

        let cached: Vec<&str> = s.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(cached, vec!["b", "a"]);
        assert_eq!(s.store.list_entries().unwrap(), s.entries().to_vec());
        assert_eq!(s.entries()[1].content, "書き直し");
    }

    #[test]
    fn test_failed_write_leaves_cache_unchanged() {
        let (mut s, kv) = state();
        s.initialize().unwrap();
        s.add_entry(entry("a")).unwrap();
        kv.set_unavailable(true);

        assert!(s.add_entry(entry("b")).is_err());
        assert_eq!(s.error(), Some(SAVE_FAILED));
        assert_eq!(s.entries().len(), 1);

        assert!(s.delete_entry(&EntryId::new("a")).is_err());
        assert_eq!(s.error(), Some(DELETE_FAILED));
        assert_eq!(s.entries().len(), 1);

        let patch = SettingsPatch {
            theme: Some(Theme::Dark),
            ..Default::default()
        };
        assert!(s.update_settings(&patch).is_err());
        assert_eq!(s.error(), Some(SETTINGS_FAILED));
        assert_eq!(s.settings().theme, Theme::System);
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let (mut s, _) = state();
        let seen: Arc<Mutex<Vec<StateChange>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let id = s.subscribe(move |c| sink.lock().unwrap().push(c.clone()));
        s.set_view(View::Stats);
        s.add_entry(entry("a")).unwrap();
        assert!(s.unsubscribe(id));
        assert!(!s.unsubscribe(id));
        s.set_view(View::List);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                StateChange::ViewChanged(View::Stats),
                StateChange::EntryAdded(EntryId::new("a")),
            ]
        );
    }

    #[test]
    fn test_stats_and_filter_use_cache() {
        let (mut s, _) = state();
        s.initialize().unwrap();
        s.add_entry(entry("a")).unwrap();
        let mut other = entry("b");
        other.set_tags(vec![DreamTag::Scary]);
        s.add_entry(other).unwrap();
        assert_eq!(s.stats().total_dreams, 2);
        let scary = s.filtered(&EntryFilter::new("", vec![DreamTag::Scary]));
        assert_eq!(scary.len(), 1);
        assert_eq!(s.effective_theme(true), Theme::Dark);
    }

    #[test]
    fn test_view_parse() {
        assert_eq!(View::parse("Stats"), Some(View::Stats));
        assert_eq!(View::parse("timeline"), None);
    }
}
