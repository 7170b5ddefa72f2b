//! 一覧の絞り込み

use crate::domain::{DreamEntry, DreamTag};

/// 検索語とタグによる絞り込み条件
///
/// 検索語は本文・解釈・キーワードに大文字小文字を区別せず部分一致、
/// タグは選んだもののどれかを持てば一致。両方を満たすものだけ残る。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub query: String,
    pub tags: Vec<DreamTag>,
}

impl EntryFilter {
    pub fn new(query: impl Into<String>, tags: Vec<DreamTag>) -> Self {
        Self {
            query: query.into(),
            tags,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.tags.is_empty()
    }

    pub fn matches(&self, entry: &DreamEntry) -> bool {
        self.matches_query(entry) && self.matches_tags(entry)
    }

    fn matches_query(&self, entry: &DreamEntry) -> bool {
        let needle = self.query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        entry.content.to_lowercase().contains(&needle)
            || entry.interpretation.to_lowercase().contains(&needle)
            || entry
                .keywords
                .iter()
                .any(|k| k.to_lowercase().contains(&needle))
    }

    fn matches_tags(&self, entry: &DreamEntry) -> bool {
        self.tags.is_empty() || self.tags.iter().any(|t| entry.tags.contains(t))
    }

    /// 一致するものを元の順で返す
    pub fn apply<'a>(&self, entries: &'a [DreamEntry]) -> Vec<&'a DreamEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryId;
    use chrono::NaiveDate;

    fn entry(id: &str, content: &str, tags: Vec<DreamTag>, keywords: &[&str]) -> DreamEntry {
        let mut e = DreamEntry::new(
            EntryId::new(id),
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            content,
            tags,
            0,
        );
        e.keywords = keywords.iter().map(|k| k.to_string()).collect();
        e
    }

    fn ids(found: Vec<&DreamEntry>) -> Vec<&str> {
        found.into_iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let entries = vec![entry("a", "x", vec![], &[]), entry("b", "y", vec![], &[])];
        let f = EntryFilter::default();
        assert!(f.is_empty());
        assert_eq!(ids(f.apply(&entries)), vec!["a", "b"]);
    }

    #[test]
    fn test_query_is_case_insensitive_over_fields() {
        let mut with_interp = entry("b", "森の中", vec![], &[]);
        with_interp.interpretation = "Freedom を求めている".to_string();
        let entries = vec![
            entry("a", "UFO を見た", vec![], &[]),
            with_interp,
            entry("c", "雨", vec![], &["freedom"]),
            entry("d", "雪", vec![], &[]),
        ];
        assert_eq!(ids(EntryFilter::new("ufo", vec![]).apply(&entries)), vec!["a"]);
        assert_eq!(ids(EntryFilter::new("FREEDOM", vec![]).apply(&entries)), vec!["b", "c"]);
    }

    #[test]
    fn test_tags_any_of_and_combined_with_query() {
        let entries = vec![
            entry("a", "海で泳ぐ", vec![DreamTag::Fun], &[]),
            entry("b", "海で溺れる", vec![DreamTag::Nightmare], &[]),
            entry("c", "山", vec![DreamTag::Fun, DreamTag::Lucid], &[]),
        ];
        let any = EntryFilter::new("", vec![DreamTag::Lucid, DreamTag::Nightmare]);
        assert_eq!(ids(any.apply(&entries)), vec!["b", "c"]);
        let both = EntryFilter::new("海", vec![DreamTag::Fun]);
        assert_eq!(ids(both.apply(&entries)), vec!["a"]);
    }
}
