//! 夢解釈・画像生成のファサード
//!
//! 設定で選ばれたプロバイダをレジストリから引き、API キーの有無を確かめてから呼ぶ。
//! キーが空なら HTTP には一切触れない。実行中フラグは呼び出しの間だけ立つ。

use crate::domain::{ImageProvider, ImageResult, InterpretationResult, Settings, TextProvider};
use crate::error::Error;
use crate::image::{
    DalleImageGenerator, GeminiImageGenerator, ImageGenerator, StabilityImageGenerator,
};
use crate::llm::{AnthropicInterpreter, GeminiInterpreter, OpenAiInterpreter, TextInterpreter};
use crate::ports::outbound::{HttpClient, Log, LogLevel, LogRecord};
use crate::redact::redact_known;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub const TEXT_KEY_MISSING: &str =
    "APIキーが設定されていません。設定画面でAPIキーを入力してください。";
pub const IMAGE_KEY_MISSING: &str = "画像生成APIキーが設定されていません。";

/// フラグを立て、スコープを抜けるとき（早期 return・エラーを含む）に下ろす
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct AiFacade {
    interpreters: HashMap<TextProvider, Arc<dyn TextInterpreter>>,
    generators: HashMap<ImageProvider, Arc<dyn ImageGenerator>>,
    log: Arc<dyn Log>,
    interpreting: AtomicBool,
    generating_image: AtomicBool,
}

impl AiFacade {
    /// 空のレジストリ
    pub fn new(log: Arc<dyn Log>) -> Self {
        Self {
            interpreters: HashMap::new(),
            generators: HashMap::new(),
            log,
            interpreting: AtomicBool::new(false),
            generating_image: AtomicBool::new(false),
        }
    }

    /// 対応している全プロバイダを登録したファサード
    pub fn with_default_providers(http: Arc<dyn HttpClient>, log: Arc<dyn Log>) -> Self {
        let mut facade = Self::new(log);
        facade.register_interpreter(Arc::new(OpenAiInterpreter::new(Arc::clone(&http))));
        facade.register_interpreter(Arc::new(AnthropicInterpreter::new(Arc::clone(&http))));
        facade.register_interpreter(Arc::new(GeminiInterpreter::new(Arc::clone(&http))));
        facade.register_generator(Arc::new(DalleImageGenerator::new(Arc::clone(&http))));
        facade.register_generator(Arc::new(StabilityImageGenerator::new(Arc::clone(&http))));
        facade.register_generator(Arc::new(GeminiImageGenerator::new(http)));
        facade
    }

    /// 同じプロバイダの登録は置き換える
    pub fn register_interpreter(&mut self, interpreter: Arc<dyn TextInterpreter>) {
        self.interpreters.insert(interpreter.provider(), interpreter);
    }

    pub fn register_generator(&mut self, generator: Arc<dyn ImageGenerator>) {
        self.generators.insert(generator.provider(), generator);
    }

    pub fn is_interpreting(&self) -> bool {
        self.interpreting.load(Ordering::SeqCst)
    }

    pub fn is_generating_image(&self) -> bool {
        self.generating_image.load(Ordering::SeqCst)
    }

    /// 設定中のテキストプロバイダで夢を解釈する
    pub fn interpret(&self, content: &str, settings: &Settings) -> Result<InterpretationResult, Error> {
        let _guard = InFlight::start(&self.interpreting);
        let api_key = settings.text_api_key.trim();
        if api_key.is_empty() {
            return Err(Error::configuration(TEXT_KEY_MISSING));
        }
        let provider = settings.text_api_provider;
        let interpreter = self
            .interpreters
            .get(&provider)
            .ok_or_else(|| Error::unsupported_provider(provider.as_str()))?;

        let started = Instant::now();
        let result = interpreter
            .interpret(content, api_key, &settings.text_model)
            .map_err(|e| e.map_message(|m| redact_known(&m, &[api_key])));
        self.record("interpret", provider.as_str(), &settings.text_model, started, &result);
        result
    }

    /// 設定中の画像プロバイダで画像を 1 枚生成する
    pub fn generate_image(&self, prompt: &str, settings: &Settings) -> Result<ImageResult, Error> {
        let _guard = InFlight::start(&self.generating_image);
        let api_key = settings.image_api_key.trim();
        if api_key.is_empty() {
            return Err(Error::configuration(IMAGE_KEY_MISSING));
        }
        let provider = settings.image_api_provider;
        let generator = self
            .generators
            .get(&provider)
            .ok_or_else(|| Error::unsupported_provider(provider.as_str()))?;

        let model = settings.image_model_selector();
        let started = Instant::now();
        let result = generator
            .generate(prompt, api_key, model)
            .map_err(|e| e.map_message(|m| redact_known(&m, &[api_key])));
        self.record("image", provider.as_str(), model.unwrap_or("-"), started, &result);
        result
    }

    fn record<T>(&self, call: &str, provider: &str, model: &str, started: Instant, result: &Result<T, Error>) {
        let elapsed = started.elapsed().as_millis() as u64;
        let rec = match result {
            Ok(_) => LogRecord::new(LogLevel::Info, format!("{} succeeded", call)),
            Err(e) => LogRecord::new(LogLevel::Warn, format!("{} failed: {}", call, e))
                .field("error_kind", e.kind()),
        };
        let rec = rec
            .layer("facade")
            .kind("provider_call")
            .field("provider", provider)
            .field("model", model)
            .field("duration_ms", elapsed);
        let _ = self.log.log(&rec);
    }
}
