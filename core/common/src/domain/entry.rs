//! 夢日記エントリとタグ

use super::ai::{ImageResult, InterpretationResult};
use super::EntryId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 夢のタグ（固定 8 種）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DreamTag {
    #[serde(rename = "楽しい")]
    Fun,
    #[serde(rename = "怖い")]
    Scary,
    #[serde(rename = "不思議")]
    Mysterious,
    #[serde(rename = "懐かしい")]
    Nostalgic,
    #[serde(rename = "予知夢")]
    Precognitive,
    #[serde(rename = "悪夢")]
    Nightmare,
    #[serde(rename = "明晰夢")]
    Lucid,
    #[serde(rename = "その他")]
    Other,
}

impl DreamTag {
    /// 表示順の全タグ
    pub const ALL: [DreamTag; 8] = [
        DreamTag::Fun,
        DreamTag::Scary,
        DreamTag::Mysterious,
        DreamTag::Nostalgic,
        DreamTag::Precognitive,
        DreamTag::Nightmare,
        DreamTag::Lucid,
        DreamTag::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fun => "楽しい",
            Self::Scary => "怖い",
            Self::Mysterious => "不思議",
            Self::Nostalgic => "懐かしい",
            Self::Precognitive => "予知夢",
            Self::Nightmare => "悪夢",
            Self::Lucid => "明晰夢",
            Self::Other => "その他",
        }
    }

    /// タグ名から解析（完全一致）
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s.trim())
    }
}

impl std::fmt::Display for DreamTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 夢日記 1 件
///
/// 保存形式はブラウザ拡張版のエクスポートと同じ camelCase の JSON。
/// 派生フィールド（解釈・画像・キーワード）は生成されるまで空。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamEntry {
    pub id: EntryId,
    pub date: NaiveDate,
    pub content: String,
    #[serde(default)]
    pub interpretation: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub image_prompt: String,
    /// 読み込んだデータに重複があってもそのまま受け入れる
    #[serde(default)]
    pub tags: Vec<DreamTag>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// 作成時刻（Unix epoch ミリ秒）
    pub created_at: i64,
    /// 最終更新時刻（Unix epoch ミリ秒）
    pub updated_at: i64,
}

impl DreamEntry {
    /// 派生フィールドが空の新規エントリ
    pub fn new(
        id: EntryId,
        date: NaiveDate,
        content: impl Into<String>,
        tags: Vec<DreamTag>,
        now_ms: i64,
    ) -> Self {
        let mut entry = Self {
            id,
            date,
            content: content.into(),
            interpretation: String::new(),
            image_url: String::new(),
            image_prompt: String::new(),
            tags: Vec::new(),
            keywords: Vec::new(),
            created_at: now_ms,
            updated_at: now_ms,
        };
        entry.set_tags(tags);
        entry
    }

    /// タグを置き換える（最初の出現順を保ったまま重複を除く）
    pub fn set_tags(&mut self, tags: Vec<DreamTag>) {
        let mut unique: Vec<DreamTag> = Vec::with_capacity(tags.len());
        for tag in tags {
            if !unique.contains(&tag) {
                unique.push(tag);
            }
        }
        self.tags = unique;
    }

    /// 重複を除いたタグ（読み込んだデータの重複に耐えるための読み出し口）
    pub fn distinct_tags(&self) -> Vec<DreamTag> {
        let mut seen: Vec<DreamTag> = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            if !seen.contains(tag) {
                seen.push(*tag);
            }
        }
        seen
    }

    /// AI 解釈の結果を反映する
    pub fn apply_interpretation(&mut self, result: &InterpretationResult, now_ms: i64) {
        self.interpretation = result.interpretation.clone();
        self.keywords = result.keywords.clone();
        self.image_prompt = result.image_prompt.clone();
        self.updated_at = now_ms;
    }

    /// 画像生成の結果を反映する
    pub fn apply_image(&mut self, result: &ImageResult, now_ms: i64) {
        self.image_url = result.image_url.clone();
        self.updated_at = now_ms;
    }

    pub fn has_interpretation(&self) -> bool {
        !self.interpretation.trim().is_empty()
    }

    pub fn has_image(&self) -> bool {
        !self.image_url.is_empty()
    }
}
