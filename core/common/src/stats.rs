//! 統計の集計（件数・月別・タグ分布・頻出キーワード）
//!
//! 同数の並びは最初に現れた順を保つ（安定ソート）。

use crate::domain::{DreamEntry, DreamTag};
use chrono::Datelike;
use serde::Serialize;

/// 月別グラフに出す月数（直近）
pub const MONTH_WINDOW: usize = 12;
/// 頻出キーワードの上限
pub const TOP_KEYWORDS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCount {
    /// `2026年1月` 形式
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: DreamTag,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DreamStats {
    pub total_dreams: usize,
    pub dreams_by_month: Vec<MonthCount>,
    pub tag_distribution: Vec<TagCount>,
    pub top_keywords: Vec<KeywordCount>,
}

pub fn month_label(year: i32, month: u32) -> String {
    format!("{}年{}月", year, month)
}

/// 出現順を保ったまま数える
fn tally<K: PartialEq>(items: impl IntoIterator<Item = K>) -> Vec<(K, usize)> {
    let mut counts: Vec<(K, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(k, _)| *k == item) {
            Some((_, n)) => *n += 1,
            None => counts.push((item, 1)),
        }
    }
    counts
}

pub fn compute_stats(entries: &[DreamEntry]) -> DreamStats {
    let mut by_month = tally(entries.iter().map(|e| (e.date.year(), e.date.month())));
    by_month.sort_by_key(|&(ym, _)| ym);
    let skip = by_month.len().saturating_sub(MONTH_WINDOW);
    let dreams_by_month = by_month
        .into_iter()
        .skip(skip)
        .map(|((y, m), count)| MonthCount {
            month: month_label(y, m),
            count,
        })
        .collect();

    // 読み込んだデータに重複タグがあっても 1 エントリ 1 回と数える
    let mut by_tag = tally(entries.iter().flat_map(|e| e.distinct_tags()));
    by_tag.sort_by(|a, b| b.1.cmp(&a.1));
    let tag_distribution = by_tag
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();

    let mut by_keyword = tally(entries.iter().flat_map(|e| e.keywords.iter().map(String::as_str)));
    by_keyword.sort_by(|a, b| b.1.cmp(&a.1));
    let top_keywords = by_keyword
        .into_iter()
        .take(TOP_KEYWORDS)
        .map(|(keyword, count)| KeywordCount {
            keyword: keyword.to_string(),
            count,
        })
        .collect();

    DreamStats {
        total_dreams: entries.len(),
        dreams_by_month,
        tag_distribution,
        top_keywords,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryId;
    use chrono::NaiveDate;

    fn entry(date: &str, tags: Vec<DreamTag>, keywords: &[&str]) -> DreamEntry {
        let mut e = DreamEntry::new(
            EntryId::new(date),
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            "夢",
            tags,
            0,
        );
        e.keywords = keywords.iter().map(|k| k.to_string()).collect();
        e
    }

    #[test]
    fn test_empty() {
        assert_eq!(compute_stats(&[]), DreamStats::default());
    }

    #[test]
    fn test_by_month_is_chronological() {
        let entries = vec![
            entry("2026-03-01", vec![], &[]),
            entry("2026-01-05", vec![], &[]),
            entry("2026-02-10", vec![], &[]),
            entry("2026-02-11", vec![], &[]),
            entry("2026-02-12", vec![], &[]),
            entry("2026-02-13", vec![], &[]),
            entry("2026-02-14", vec![], &[]),
            entry("2026-01-20", vec![], &[]),
        ];
        let s = compute_stats(&entries);
        assert_eq!(s.total_dreams, 8);
        assert_eq!(
            s.dreams_by_month,
            vec![
                MonthCount { month: "2026年1月".to_string(), count: 2 },
                MonthCount { month: "2026年2月".to_string(), count: 5 },
                MonthCount { month: "2026年3月".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_by_month_keeps_last_twelve() {
        let entries: Vec<DreamEntry> = (1..=12)
            .map(|m| entry(&format!("2025-{:02}-01", m), vec![], &[]))
            .chain([entry("2026-01-01", vec![], &[]), entry("2024-12-31", vec![], &[])])
            .collect();
        let s = compute_stats(&entries);
        assert_eq!(s.dreams_by_month.len(), 12);
        assert_eq!(s.dreams_by_month[0].month, "2025年2月");
        assert_eq!(s.dreams_by_month[11].month, "2026年1月");
    }

    #[test]
    fn test_tag_distribution_descending_with_stable_ties() {
        let entries = vec![
            entry("2026-01-01", vec![DreamTag::Mysterious, DreamTag::Fun], &[]),
            entry("2026-01-02", vec![DreamTag::Fun], &[]),
            entry("2026-01-03", vec![DreamTag::Scary], &[]),
        ];
        let s = compute_stats(&entries);
        assert_eq!(s.tag_distribution[0], TagCount { tag: DreamTag::Fun, count: 2 });
        assert_eq!(s.tag_distribution[1].tag, DreamTag::Mysterious);
        assert_eq!(s.tag_distribution[2].tag, DreamTag::Scary);
        let total: usize = s.tag_distribution.iter().map(|t| t.count).sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_duplicate_tags_count_once_per_entry() {
        let mut e = entry("2026-01-01", vec![], &[]);
        e.tags = vec![DreamTag::Lucid, DreamTag::Lucid];
        let s = compute_stats(&[e]);
        assert_eq!(s.tag_distribution, vec![TagCount { tag: DreamTag::Lucid, count: 1 }]);
    }

    #[test]
    fn test_top_keywords_limited_to_twenty() {
        let many: Vec<String> = (0..25).map(|i| format!("k{}", i)).collect();
        let refs: Vec<&str> = many.iter().map(String::as_str).collect();
        let entries = vec![
            entry("2026-01-01", vec![], &refs),
            entry("2026-01-02", vec![], &["k24", "k3"]),
        ];
        let s = compute_stats(&entries);
        assert_eq!(s.top_keywords.len(), 20);
        assert_eq!(s.top_keywords[0], KeywordCount { keyword: "k3".to_string(), count: 2 });
        assert_eq!(s.top_keywords[1].keyword, "k24");
        assert_eq!(s.top_keywords[2].keyword, "k0");
    }
}
