//! 表示用の整形
//!
//! Runner が標準出力に書く文字列をここで組み立てる。I/O は持たない。

use chrono::{Datelike, NaiveDate, Weekday};
use common::domain::settings::mask_secret;
use common::domain::{DreamEntry, DreamTag, ImageProvider, Settings, TextProvider};
use common::stats::DreamStats;
use common::store::ImportSummary;

const LIST_PREVIEW_CHARS: usize = 40;
const BAR_WIDTH: usize = 20;

/// 指定文字数で切り詰める（超えた分は ... にする）
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    let single_line = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if single_line.chars().count() <= max_chars {
        return single_line;
    }
    let head: String = single_line.chars().take(max_chars).collect();
    format!("{}...", head)
}

fn weekday_ja(w: Weekday) -> &'static str {
    match w {
        Weekday::Mon => "月",
        Weekday::Tue => "火",
        Weekday::Wed => "水",
        Weekday::Thu => "木",
        Weekday::Fri => "金",
        Weekday::Sat => "土",
        Weekday::Sun => "日",
    }
}

/// `2026年1月15日(木)`
pub fn format_date_ja(date: NaiveDate) -> String {
    format!(
        "{}年{}月{}日({})",
        date.year(),
        date.month(),
        date.day(),
        weekday_ja(date.weekday())
    )
}

/// 現在時刻からの相対表記（ミリ秒同士）
pub fn relative_time(now_ms: i64, ts_ms: i64) -> String {
    let seconds = (now_ms - ts_ms).max(0) / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    if days > 0 {
        format!("{}日前", days)
    } else if hours > 0 {
        format!("{}時間前", hours)
    } else if minutes > 0 {
        format!("{}分前", minutes)
    } else {
        "たった今".to_string()
    }
}

fn tags_text(tags: &[DreamTag]) -> String {
    tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" ")
}

/// 一覧の 1 行
pub fn entry_line(entry: &DreamEntry) -> String {
    let mut marks = String::new();
    if entry.has_interpretation() {
        marks.push('*');
    }
    if entry.has_image() {
        marks.push('@');
    }
    let mut line = format!(
        "{}  {}  {:<2} {}",
        entry.id,
        entry.date.format("%Y-%m-%d"),
        marks,
        truncate_text(&entry.content, LIST_PREVIEW_CHARS)
    );
    if !entry.tags.is_empty() {
        line.push_str("  ");
        line.push_str(&tags_text(&entry.tags));
    }
    line
}

/// 1 件の詳細
pub fn entry_detail(entry: &DreamEntry, now_ms: i64) -> String {
    let mut out = Vec::new();
    out.push(format!("ID:    {}", entry.id));
    out.push(format!("日付:  {}", format_date_ja(entry.date)));
    if !entry.tags.is_empty() {
        out.push(format!("タグ:  {}", tags_text(&entry.tags)));
    }
    out.push(format!("更新:  {}", relative_time(now_ms, entry.updated_at)));
    out.push(String::new());
    out.push(entry.content.clone());
    if entry.has_interpretation() {
        out.push(String::new());
        out.push("── 夢の解釈 ──".to_string());
        out.push(entry.interpretation.clone());
    }
    if !entry.keywords.is_empty() {
        out.push(String::new());
        out.push(format!("キーワード: {}", entry.keywords.join(", ")));
    }
    if !entry.image_prompt.is_empty() {
        out.push(format!("画像プロンプト: {}", entry.image_prompt));
    }
    if entry.has_image() {
        let kind = if entry.image_url.starts_with("data:") {
            "埋め込み画像あり（diary save-image で書き出せます）"
        } else {
            entry.image_url.as_str()
        };
        out.push(format!("画像: {}", kind));
    }
    out.join("\n")
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let width = (count * BAR_WIDTH).div_ceil(max);
    "█".repeat(width)
}

pub fn stats_text(stats: &DreamStats) -> String {
    let mut out = vec![format!("記録した夢: {}件", stats.total_dreams)];
    if stats.total_dreams == 0 {
        return out.join("\n");
    }

    out.push(String::new());
    out.push("月別".to_string());
    let max = stats.dreams_by_month.iter().map(|m| m.count).max().unwrap_or(0);
    for m in &stats.dreams_by_month {
        out.push(format!("  {:<10} {:>3} {}", m.month, m.count, bar(m.count, max)));
    }

    if !stats.tag_distribution.is_empty() {
        out.push(String::new());
        out.push("タグ".to_string());
        let max = stats.tag_distribution.iter().map(|t| t.count).max().unwrap_or(0);
        for t in &stats.tag_distribution {
            out.push(format!("  {:<6} {:>3} {}", t.tag.as_str(), t.count, bar(t.count, max)));
        }
    }

    if !stats.top_keywords.is_empty() {
        out.push(String::new());
        out.push("よく出るキーワード".to_string());
        let words: Vec<String> = stats
            .top_keywords
            .iter()
            .map(|k| format!("{}({})", k.keyword, k.count))
            .collect();
        out.push(format!("  {}", words.join("  ")));
    }
    out.join("\n")
}

/// 設定の表示（API キーは伏せる）
pub fn settings_text(settings: &Settings) -> String {
    let mut out = vec![
        format!(
            "夢解釈:   {} / {}",
            settings.text_api_provider.label(),
            settings.text_model
        ),
        format!("  APIキー: {}", mask_secret(&settings.text_api_key)),
        format!("画像生成: {}", settings.image_api_provider.label()),
        format!("  APIキー: {}", mask_secret(&settings.image_api_key)),
    ];
    if settings.image_api_provider == ImageProvider::Gemini {
        out.push(format!("  モデル:  {}", settings.gemini_image_model));
    }
    out.push(format!("テーマ:   {}", settings.theme.as_str()));
    out.join("\n")
}

/// モデル一覧（現在の設定に印を付ける）
pub fn models_text(providers: &[TextProvider], settings: &Settings) -> String {
    let mut out = Vec::new();
    for provider in providers {
        out.push(format!("{} ({})", provider.label(), provider.as_str()));
        for (id, label) in provider.models() {
            let current = *provider == settings.text_api_provider && settings.text_model == *id;
            let default = provider.default_model() == *id;
            let mut line = format!("  {} {:<28} {}", if current { "*" } else { " " }, id, label);
            if default {
                line.push_str(" [default]");
            }
            out.push(line);
        }
    }
    out.join("\n")
}

pub fn import_text(summary: &ImportSummary) -> String {
    let mut parts = Vec::new();
    if let Some(n) = summary.entries {
        parts.push(format!("{}件の夢", n));
    }
    if summary.settings {
        parts.push("設定".to_string());
    }
    if parts.is_empty() {
        "取り込むデータがありませんでした".to_string()
    } else {
        format!("{}を取り込みました", parts.join("と"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::domain::EntryId;
    use common::stats::compute_stats;

    fn entry() -> DreamEntry {
        DreamEntry::new(
            EntryId::new("abc"),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            "知らない駅で\n電車を待っていた",
            vec![DreamTag::Mysterious],
            0,
        )
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("短い", 10), "短い");
        assert_eq!(truncate_text("あいうえおかきくけこ", 5), "あいうえお...");
        assert_eq!(truncate_text("a\n b", 10), "a b");
    }

    #[test]
    fn test_format_date_ja() {
        assert_eq!(format_date_ja(NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()), "2026年1月15日(木)");
    }

    #[test]
    fn test_relative_time() {
        assert_eq!(relative_time(10_000, 9_500), "たった今");
        assert_eq!(relative_time(5 * 60_000, 0), "5分前");
        assert_eq!(relative_time(3 * 3_600_000, 0), "3時間前");
        assert_eq!(relative_time(2 * 86_400_000, 0), "2日前");
    }

    #[test]
    fn test_entry_line() {
        let line = entry_line(&entry());
        assert!(line.starts_with("abc  2026-01-15"));
        assert!(line.contains("知らない駅で 電車を待っていた"));
        assert!(line.ends_with("#不思議"));
    }

    #[test]
    fn test_entry_detail_sections() {
        let mut e = entry();
        let plain = entry_detail(&e, 0);
        assert!(!plain.contains("夢の解釈"));
        e.interpretation = "旅立ちの暗示".to_string();
        e.keywords = vec!["駅".to_string()];
        e.image_url = "data:image/png;base64,AA".to_string();
        let full = entry_detail(&e, 0);
        assert!(full.contains("旅立ちの暗示"));
        assert!(full.contains("キーワード: 駅"));
        assert!(full.contains("save-image"));
    }

    #[test]
    fn test_stats_text_empty_and_filled() {
        assert_eq!(stats_text(&DreamStats::default()), "記録した夢: 0件");
        let text = stats_text(&compute_stats(&[entry()]));
        assert!(text.contains("2026年1月"));
        assert!(text.contains("不思議"));
    }

    #[test]
    fn test_settings_text_masks_keys() {
        let s = Settings {
            text_api_key: "sk-abcdefghijklmnop".to_string(),
            ..Default::default()
        };
        let text = settings_text(&s);
        assert!(!text.contains("sk-abcdefghijklmnop"));
        assert!(text.contains("mnop"));
        assert!(text.contains("(未設定)"));
    }

    #[test]
    fn test_models_text_marks_current() {
        let text = models_text(&[TextProvider::OpenAi], &Settings::default());
        assert!(text.contains("* gpt-4.1-mini"));
        assert!(text.contains("[default]"));
    }

    #[test]
    fn test_import_text() {
        assert_eq!(
            import_text(&ImportSummary { entries: Some(3), settings: true }),
            "3件の夢と設定を取り込みました"
        );
        assert_eq!(import_text(&ImportSummary::default()), "取り込むデータがありませんでした");
    }
}
