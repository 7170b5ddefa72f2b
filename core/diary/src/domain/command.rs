//! diary コマンドの enum（Command Pattern）
//!
//! サブコマンドごとの入力を enum で明示し、ディスパッチは main の Runner に集約する。

use chrono::NaiveDate;
use common::domain::{DreamTag, EntryId, SettingsPatch, TextProvider};
use common::search::EntryFilter;
use std::path::PathBuf;

/// 新規エントリの入力
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AddRequest {
    /// None なら今日
    pub date: Option<NaiveDate>,
    pub tags: Vec<DreamTag>,
    /// None なら標準入力から読む
    pub content: Option<String>,
    /// 保存前に夢を解釈する
    pub interpret: bool,
    /// 解釈で得たプロンプトから画像も生成する
    pub image: bool,
}

/// diary の実行内容
#[derive(Debug, Clone, PartialEq)]
pub enum DiaryCommand {
    Help,
    Add(AddRequest),
    List {
        filter: EntryFilter,
        limit: Option<usize>,
        json: bool,
    },
    Show {
        id: EntryId,
        json: bool,
    },
    Interpret {
        id: EntryId,
    },
    Image {
        id: EntryId,
        /// 指定があれば保存済みの画像プロンプトの代わりに使う
        prompt: Option<String>,
    },
    SaveImage {
        id: EntryId,
        path: PathBuf,
    },
    Delete {
        id: EntryId,
    },
    Stats {
        json: bool,
    },
    SettingsShow,
    SettingsSet(SettingsPatch),
    /// 選べるモデルの一覧（provider 未指定なら全プロバイダ）
    Models {
        provider: Option<TextProvider>,
    },
    Export {
        /// None なら標準出力
        output: Option<PathBuf>,
    },
    Import {
        /// None なら標準入力
        input: Option<PathBuf>,
    },
    Clear {
        yes: bool,
    },
}

impl DiaryCommand {
    /// ログに残すコマンド名
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Add(_) => "add",
            Self::List { .. } => "list",
            Self::Show { .. } => "show",
            Self::Interpret { .. } => "interpret",
            Self::Image { .. } => "image",
            Self::SaveImage { .. } => "save-image",
            Self::Delete { .. } => "delete",
            Self::Stats { .. } => "stats",
            Self::SettingsShow => "settings-show",
            Self::SettingsSet(_) => "settings-set",
            Self::Models { .. } => "models",
            Self::Export { .. } => "export",
            Self::Import { .. } => "import",
            Self::Clear { .. } => "clear",
        }
    }
}
