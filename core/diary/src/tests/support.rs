//! テスト用の配線（ネットワーク・環境変数・時刻を差し替える）

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use common::adapter::{FileJsonLog, FileKeyValueStorage, StdFileSystem};
use common::domain::{Dirs, EntryId};
use common::error::Error;
use common::ports::outbound::{
    Clock, EnvResolver, FileSystem, HttpClient, HttpRequest, HttpResponse, IdGenerator,
};

use crate::wiring::{wire_with, App, Deps};

/// URL の一部に一致した応答を返し、送られたリクエストを記録する
#[derive(Default)]
pub struct StubHttp {
    routes: Mutex<Vec<(String, HttpResponse)>>,
    pub requests: Mutex<Vec<HttpRequest>>,
}

impl StubHttp {
    pub fn route(&self, url_part: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .push((url_part.to_string(), HttpResponse::new(status, body)));
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl HttpClient for StubHttp {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        self.requests.lock().unwrap().push(request.clone());
        self.routes
            .lock()
            .unwrap()
            .iter()
            .find(|(part, _)| request.url.contains(part.as_str()))
            .map(|(_, r)| r.clone())
            .ok_or_else(|| Error::transport(format!("no route for {}", request.url)))
    }
}

/// 固定の環境変数
#[derive(Default)]
pub struct StubEnv {
    pub vars: HashMap<String, String>,
}

impl EnvResolver for StubEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }

    fn resolve_dirs(&self, home_override: Option<&Path>) -> Result<Dirs, Error> {
        home_override
            .map(Dirs::new)
            .ok_or_else(|| Error::configuration("no home in tests"))
    }
}

/// 呼ぶたびに 1 秒進む時計（2026-01-15 から）
pub struct TickClock(AtomicU64);

impl Default for TickClock {
    fn default() -> Self {
        Self(AtomicU64::new(1_768_435_200_000))
    }
}

impl Clock for TickClock {
    fn now_ms(&self) -> i64 {
        self.0.fetch_add(1_000, Ordering::SeqCst) as i64
    }
}

/// e1, e2, ... を順に返す
#[derive(Default)]
pub struct SeqIds(AtomicU64);

impl IdGenerator for SeqIds {
    fn next_id(&self) -> EntryId {
        EntryId::new(format!("e{}", self.0.fetch_add(1, Ordering::SeqCst) + 1))
    }
}

/// tempdir 上のファイルストレージとスタブ HTTP で App を組み立てる
pub fn test_app(home: &Path, http: Arc<StubHttp>, env: StubEnv) -> App {
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let dirs = Dirs::new(home);
    wire_with(Deps {
        storage: Arc::new(FileKeyValueStorage::new(Arc::clone(&fs), dirs.storage_dir())),
        logger: Arc::new(FileJsonLog::new(Arc::clone(&fs), dirs.log_file())),
        http,
        env: Arc::new(env),
        clock: Arc::new(TickClock::default()),
        id_gen: Arc::new(SeqIds::default()),
        fs,
    })
}

pub const OPENAI_INTERPRETATION: &str = r#"{"choices":[{"message":{"content":"{\"interpretation\":\"新しい世界への期待を表しています。\",\"keywords\":[\"空\",\"自由\"],\"imagePrompt\":\"a child flying over a pastel town\"}"}}]}"#;

pub const DALLE_IMAGE: &str = r#"{"data":[{"b64_json":"iVBORw0KGgo=","revised_prompt":"a child flying"}]}"#;
