//! 時刻 Outbound ポート
//!
//! usecase はこの trait 経由で「現在時刻」と「今日の日付」を取得する。

use chrono::{Local, NaiveDate, TimeZone};

/// 時刻取得の抽象
///
/// 実装は `common::adapter::StdClock` やテスト用の固定時刻など。
pub trait Clock: Send + Sync {
    /// 現在時刻をミリ秒（Unix epoch）で返す
    fn now_ms(&self) -> i64;

    /// ローカルタイムゾーンでの今日の日付
    fn today(&self) -> NaiveDate {
        Local
            .timestamp_millis_opt(self.now_ms())
            .single()
            .map(|dt| dt.date_naive())
            .unwrap_or_else(|| Local::now().date_naive())
    }
}
