//! 設定レコード（インストールごとに 1 件）
//!
//! 保存済みの部分レコードは常に既定値の上にマージして読む。後から追加したフィールドは
//! 古いデータに無くても既定値で埋まる。

use serde::{Deserialize, Serialize};

/// 夢解釈に使うテキスト AI プロバイダ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Gemini,
}

impl TextProvider {
    pub const ALL: [TextProvider; 3] = [Self::OpenAi, Self::Anthropic, Self::Gemini];

    /// 文字列からプロバイダを解析（大文字小文字は無視）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "gpt" => Some(Self::OpenAi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
        }
    }

    /// 画面表示用の名前
    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI (GPT)",
            Self::Anthropic => "Anthropic (Claude)",
            Self::Gemini => "Google (Gemini)",
        }
    }

    /// プロバイダ切り替え時に選ばれるモデル
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4.1-mini",
            Self::Anthropic => "claude-sonnet-4-5-20250514",
            Self::Gemini => "gemini-3-flash",
        }
    }

    /// 選択肢として提示するモデル（id, 表示名）
    pub fn models(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::OpenAi => &[
                ("gpt-5.2", "GPT-5.2"),
                ("gpt-5.2-pro", "GPT-5.2 Pro"),
                ("gpt-4.1", "GPT-4.1"),
                ("gpt-4.1-mini", "GPT-4.1 Mini"),
                ("o4-mini", "o4-mini (推論)"),
            ],
            Self::Anthropic => &[
                ("claude-opus-4-5-20251101", "Claude Opus 4.5"),
                ("claude-sonnet-4-5-20250514", "Claude Sonnet 4.5"),
                ("claude-haiku-4-5-20251015", "Claude Haiku 4.5"),
            ],
            Self::Gemini => &[
                ("gemini-3-flash", "Gemini 3 Flash"),
                ("gemini-3-pro", "Gemini 3 Pro"),
                ("gemini-2.5-flash", "Gemini 2.5 Flash"),
            ],
        }
    }

    /// 保存済みキーが空のときに参照する環境変数
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl std::fmt::Display for TextProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 画像生成プロバイダ（テキスト側とは独立に選ぶ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Stability,
    Gemini,
}

impl ImageProvider {
    pub const ALL: [ImageProvider; 3] = [Self::OpenAi, Self::Stability, Self::Gemini];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "dalle" | "dall-e" => Some(Self::OpenAi),
            "stability" | "stability-ai" => Some(Self::Stability),
            "gemini" | "google" => Some(Self::Gemini),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Stability => "stability",
            Self::Gemini => "gemini",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI (DALL-E 3)",
            Self::Stability => "Stability AI",
            Self::Gemini => "Google (Gemini)",
        }
    }

    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Stability => "STABILITY_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    /// 同じ API キーを共有できるテキストプロバイダ
    pub fn shares_key_with(&self) -> Option<TextProvider> {
        match self {
            Self::OpenAi => Some(TextProvider::OpenAi),
            Self::Gemini => Some(TextProvider::Gemini),
            Self::Stability => None,
        }
    }
}

impl std::fmt::Display for ImageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gemini の画像モデル
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeminiImageModel {
    #[default]
    #[serde(rename = "gemini-2.5-flash-image")]
    Flash25,
    /// 高解像度（2K）で出力させるモデル
    #[serde(rename = "gemini-3-pro-image-preview")]
    Pro3Preview,
}

impl GeminiImageModel {
    pub const ALL: [GeminiImageModel; 2] = [Self::Flash25, Self::Pro3Preview];

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s.trim())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flash25 => "gemini-2.5-flash-image",
            Self::Pro3Preview => "gemini-3-pro-image-preview",
        }
    }
}

impl std::fmt::Display for GeminiImageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 表示テーマ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "system" => Some(Self::System),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// 実際に使うテーマ（Light / Dark のどちらか）
    pub fn resolve(&self, system_prefers_dark: bool) -> Theme {
        match self {
            Self::System if system_prefers_dark => Self::Dark,
            Self::System => Self::Light,
            other => *other,
        }
    }
}

/// 設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub text_api_provider: TextProvider,
    /// 平文で保存される
    pub text_api_key: String,
    pub text_model: String,
    pub image_api_provider: ImageProvider,
    pub image_api_key: String,
    pub gemini_image_model: GeminiImageModel,
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            text_api_provider: TextProvider::OpenAi,
            text_api_key: String::new(),
            text_model: TextProvider::OpenAi.default_model().to_string(),
            image_api_provider: ImageProvider::OpenAi,
            image_api_key: String::new(),
            gemini_image_model: GeminiImageModel::default(),
            theme: Theme::System,
        }
    }
}

impl Settings {
    /// 画像プロバイダに渡すモデル指定（Gemini 以外は固定モデルなので None）
    pub fn image_model_selector(&self) -> Option<&'static str> {
        match self.image_api_provider {
            ImageProvider::Gemini => Some(self.gemini_image_model.as_str()),
            ImageProvider::OpenAi | ImageProvider::Stability => None,
        }
    }
}

/// 設定の部分更新
///
/// None のフィールドは保存済みの値を保つ。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_api_provider: Option<TextProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_api_provider: Option<ImageProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_image_model: Option<GeminiImageModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

impl SettingsPatch {
    /// テキストプロバイダを切り替え、モデルをそのプロバイダの既定に戻す
    pub fn switch_text_provider(mut self, provider: TextProvider) -> Self {
        self.text_api_provider = Some(provider);
        self.text_model = Some(provider.default_model().to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// settings に上書きマージする
    pub fn apply_to(&self, settings: &mut Settings) {
        if let Some(p) = self.text_api_provider {
            settings.text_api_provider = p;
        }
        if let Some(ref k) = self.text_api_key {
            settings.text_api_key = k.clone();
        }
        if let Some(ref m) = self.text_model {
            settings.text_model = m.clone();
        }
        if let Some(p) = self.image_api_provider {
            settings.image_api_provider = p;
        }
        if let Some(ref k) = self.image_api_key {
            settings.image_api_key = k.clone();
        }
        if let Some(m) = self.gemini_image_model {
            settings.gemini_image_model = m;
        }
        if let Some(t) = self.theme {
            settings.theme = t;
        }
    }
}

/// API キーを画面表示用に伏せる（末尾 4 文字だけ残す）
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.is_empty() {
        return "(未設定)".to_string();
    }
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(8), tail)
}
