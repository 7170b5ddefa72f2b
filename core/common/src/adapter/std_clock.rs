//! 標準時刻実装（chrono の現在時刻を委譲）

use crate::ports::outbound::Clock;

/// システム時刻を使う Clock 実装
#[derive(Debug, Clone, Default)]
pub struct StdClock;

impl Clock for StdClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_after_2020() {
        assert!(StdClock.now_ms() > 1_577_836_800_000);
    }
}
