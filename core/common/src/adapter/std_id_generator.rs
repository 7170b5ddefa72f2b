//! EntryId を生成する IdGenerator の標準実装（Clock + グローバルシーケンス）
//!
//! 形式: 時刻部 8 文字 + プロセス部 4 文字の base62。辞書順がおおむね作成順になる。

use crate::domain::EntryId;
use crate::ports::outbound::{Clock, IdGenerator};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static LAST_ID: AtomicU64 = AtomicU64::new(0);

const EPOCH_MS: u64 = 1577836800000; // 2020-01-01 00:00:00 UTC
const SEQ_BITS: u64 = 8;
const BASE: u64 = 62;
const WIDTH: usize = 8;
const PROC_WIDTH: usize = 4;
const MAX_VAL: u64 = BASE.pow(WIDTH as u32) - 1;

/// 0-9, A-Z, a-z の順で辞書順＝数値順になるbase62
const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Clock + グローバルシーケンスで EntryId を生成する標準実装
pub struct StdIdGenerator {
    clock: Arc<dyn Clock>,
    proc_tag: String,
}

impl StdIdGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            proc_tag: to_base62(u64::from(std::process::id()), PROC_WIDTH),
        }
    }
}

impl IdGenerator for StdIdGenerator {
    fn next_id(&self) -> EntryId {
        let ms = self.clock.now_ms().max(0) as u64;
        let ms_rel = ms.saturating_sub(EPOCH_MS);
        let base = (ms_rel << SEQ_BITS).min(MAX_VAL);

        loop {
            let prev = LAST_ID.load(Ordering::SeqCst);
            // 同じミリ秒で 256 件を超えたら次のミリ秒の枠へ繰り上げる（時計を待たない）
            let next = if (prev >> SEQ_BITS) < ms_rel {
                base
            } else {
                (prev + 1).min(MAX_VAL)
            };
            if LAST_ID
                .compare_exchange(prev, next, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return EntryId::new(format!("{}{}", to_base62(next, WIDTH), self.proc_tag));
            }
        }
    }
}

/// 固定幅の base62（幅を超える上位桁は捨てる）
fn to_base62(mut n: u64, width: usize) -> String {
    let mut buf = vec![b'0'; width];
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(n % BASE) as usize];
        n /= BASE;
    }
    buf.into_iter().map(char::from).collect()
}
