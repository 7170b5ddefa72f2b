//! ドメイン型（Newtype とエントリ・設定モデル）
//!
//! String / PathBuf を直接運ばず、意味のある型に包んで境界を明確にする。

pub mod ai;
pub mod dirs;
pub mod entry;
pub mod settings;

use serde::{Deserialize, Serialize};

pub use ai::{ImageResult, InterpretationResult};
pub use dirs::Dirs;
pub use entry::{DreamEntry, DreamTag};
pub use settings::{
    GeminiImageModel, ImageProvider, Settings, SettingsPatch, TextProvider, Theme,
};

/// エントリ ID（生成時に決まり、以後不変）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for EntryId {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
