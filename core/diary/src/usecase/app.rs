//! diary のユースケース
//!
//! エントリの変更はすべて AppState を通す（ストアへ書けたときだけキャッシュが変わる）。
//! AI 呼び出しは AiFacade に任せ、API キーが空なら環境変数を実行時だけ補う（保存はしない）。

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use common::domain::{DreamEntry, EntryId, Settings, SettingsPatch};
use common::error::Error;
use common::facade::AiFacade;
use common::ports::outbound::{Clock, EnvResolver, FileSystem, IdGenerator, Log, LogLevel, LogRecord};
use common::search::EntryFilter;
use common::state::AppState;
use common::stats::DreamStats;
use common::store::{DreamStore, ImportSummary};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::AddRequest;

pub const EMPTY_CONTENT: &str = "夢の内容を入力してください";
pub const NO_IMAGE_PROMPT: &str = "画像プロンプトがありません。先に夢を解釈するか --prompt を指定してください";

/// add の結果（AI の失敗はエントリを保存したうえで警告として返す）
#[derive(Debug, Clone, PartialEq)]
pub struct AddOutcome {
    pub entry: DreamEntry,
    pub warnings: Vec<String>,
}

pub struct DiaryUseCase {
    state: Mutex<AppState>,
    store: Arc<DreamStore>,
    facade: AiFacade,
    clock: Arc<dyn Clock>,
    id_gen: Arc<dyn IdGenerator>,
    env: Arc<dyn EnvResolver>,
    fs: Arc<dyn FileSystem>,
    log: Arc<dyn Log>,
}

impl DiaryUseCase {
    pub fn new(
        store: Arc<DreamStore>,
        facade: AiFacade,
        clock: Arc<dyn Clock>,
        id_gen: Arc<dyn IdGenerator>,
        env: Arc<dyn EnvResolver>,
        fs: Arc<dyn FileSystem>,
        log: Arc<dyn Log>,
    ) -> Self {
        let mut state = AppState::new(Arc::clone(&store));
        let state_log = Arc::clone(&log);
        state.subscribe(move |change| {
            let _ = state_log.log(
                &LogRecord::new(LogLevel::Debug, "state changed")
                    .layer("usecase")
                    .kind("state")
                    .field("change", format!("{:?}", change)),
            );
        });
        Self {
            state: Mutex::new(state),
            store,
            facade,
            clock,
            id_gen,
            env,
            fs,
            log,
        }
    }

    /// ストアから読み直した状態
    fn loaded(&self) -> Result<MutexGuard<'_, AppState>, Error> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| Error::storage("state lock poisoned"))?;
        state.initialize()?;
        Ok(state)
    }

    fn find(state: &AppState, id: &EntryId) -> Result<DreamEntry, Error> {
        state
            .entry(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("夢が見つかりません: {}", id)))
    }

    /// 保存済みキーが空なら環境変数で補った設定
    pub fn effective_settings(&self, settings: &Settings) -> Settings {
        let mut s = settings.clone();
        if s.text_api_key.trim().is_empty() {
            if let Some(key) = self.env.var(s.text_api_provider.api_key_env()) {
                s.text_api_key = key;
            }
        }
        if s.image_api_key.trim().is_empty() {
            if let Some(key) = self.env.var(s.image_api_provider.api_key_env()) {
                s.image_api_key = key;
            } else if s.image_api_provider.shares_key_with() == Some(s.text_api_provider) {
                s.image_api_key = s.text_api_key.clone();
            }
        }
        s
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub fn add(&self, request: AddRequest, content: &str) -> Result<AddOutcome, Error> {
        let content = content.trim();
        if content.is_empty() {
            return Err(Error::invalid_argument(EMPTY_CONTENT));
        }
        let mut state = self.loaded()?;
        let now = self.clock.now_ms();
        let mut entry = DreamEntry::new(
            self.id_gen.next_id(),
            request.date.unwrap_or_else(|| self.clock.today()),
            content,
            request.tags,
            now,
        );

        let mut warnings = Vec::new();
        if request.interpret {
            let settings = self.effective_settings(state.settings());
            match self.facade.interpret(content, &settings) {
                Ok(result) => entry.apply_interpretation(&result, self.clock.now_ms()),
                Err(e) => warnings.push(e.to_string()),
            }
            if request.image && entry.has_interpretation() {
                match self.facade.generate_image(&entry.image_prompt, &settings) {
                    Ok(image) => entry.apply_image(&image, self.clock.now_ms()),
                    Err(e) => warnings.push(e.to_string()),
                }
            }
        }
        let saved = state.add_entry(entry)?;
        Ok(AddOutcome {
            entry: saved,
            warnings,
        })
    }

    pub fn list(&self, filter: &EntryFilter, limit: Option<usize>) -> Result<Vec<DreamEntry>, Error> {
        let state = self.loaded()?;
        let found = state.filtered(filter);
        Ok(found
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    pub fn show(&self, id: &EntryId) -> Result<DreamEntry, Error> {
        let state = self.loaded()?;
        Self::find(&state, id)
    }

    /// 保存済みの夢を解釈し直して保存する
    pub fn interpret(&self, id: &EntryId) -> Result<DreamEntry, Error> {
        let mut state = self.loaded()?;
        let mut entry = Self::find(&state, id)?;
        let settings = self.effective_settings(state.settings());
        let result = self.facade.interpret(&entry.content, &settings)?;
        entry.apply_interpretation(&result, self.clock.now_ms());
        state.update_entry(entry)
    }

    /// 画像を生成して保存する（prompt 指定時はそれを画像プロンプトとして残す）
    pub fn generate_image(&self, id: &EntryId, prompt: Option<&str>) -> Result<DreamEntry, Error> {
        let mut state = self.loaded()?;
        let mut entry = Self::find(&state, id)?;
        if let Some(p) = prompt.map(str::trim).filter(|p| !p.is_empty()) {
            entry.image_prompt = p.to_string();
        }
        if entry.image_prompt.trim().is_empty() {
            return Err(Error::invalid_argument(NO_IMAGE_PROMPT));
        }
        let settings = self.effective_settings(state.settings());
        let image = self.facade.generate_image(&entry.image_prompt, &settings)?;
        entry.apply_image(&image, self.clock.now_ms());
        state.update_entry(entry)
    }

    /// data URI の画像をファイルへ書き出し、書いたバイト数を返す
    pub fn save_image(&self, id: &EntryId, path: &Path) -> Result<usize, Error> {
        let entry = self.show(id)?;
        if !entry.has_image() {
            return Err(Error::not_found(format!("画像がありません: {}", id)));
        }
        let bytes = decode_data_uri(&entry.image_url)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.fs.create_dir_all(parent)?;
        }
        self.fs.write_bytes(path, &bytes)?;
        Ok(bytes.len())
    }

    pub fn delete(&self, id: &EntryId) -> Result<bool, Error> {
        let mut state = self.loaded()?;
        state.delete_entry(id)
    }

    pub fn stats(&self) -> Result<DreamStats, Error> {
        Ok(self.loaded()?.stats())
    }

    pub fn settings(&self) -> Result<Settings, Error> {
        Ok(self.loaded()?.settings().clone())
    }

    pub fn update_settings(&self, patch: &SettingsPatch) -> Result<Settings, Error> {
        if patch.is_empty() {
            return Err(Error::invalid_argument(
                "変更する項目を指定してください（diary settings set --help）",
            ));
        }
        let mut state = self.loaded()?;
        state.update_settings(patch)
    }

    pub fn export(&self) -> Result<String, Error> {
        self.store.export_all()
    }

    pub fn import(&self, text: &str) -> Result<ImportSummary, Error> {
        let summary = self.store.import_all(text)?;
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "data imported")
                .layer("usecase")
                .kind("import")
                .field("entries", summary.entries.map(|n| n as u64))
                .field("settings", summary.settings),
        );
        drop(self.loaded()?);
        Ok(summary)
    }

    pub fn clear(&self, confirmed: bool) -> Result<(), Error> {
        if !confirmed {
            return Err(Error::invalid_argument(
                "すべての夢と設定を消去します。実行するには --yes を付けてください",
            ));
        }
        self.store.clear_all()?;
        drop(self.loaded()?);
        Ok(())
    }
}

/// `data:<mime>;base64,<data>` をバイト列に戻す
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, Error> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| Error::invalid_argument("データURI形式の画像ではありません"))?;
    let (meta, data) = rest
        .split_once(',')
        .ok_or_else(|| Error::parse("データURIの形式が不正です"))?;
    if !meta.ends_with(";base64") {
        return Err(Error::parse("base64 形式ではないデータURIです"));
    }
    STANDARD
        .decode(data.trim())
        .map_err(|e| Error::parse(format!("画像データの復号に失敗しました: {}", e)))
}
