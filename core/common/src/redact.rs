//! 秘密情報のマスク
//!
//! API キーは平文で保存されるため、ログやエラーメッセージに出す前にここを通す。
//! reqwest のエラーは URL をそのまま含む（Gemini は ?key= にキーが入る）。

use regex::Regex;
use std::sync::OnceLock;

const MASK: &str = "***";

fn patterns() -> &'static [(Regex, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"([?&]key=)[^&\s'\x22]+", "${1}***"),
            (r"(?i)(bearer\s+)[A-Za-z0-9._~+/=\-]+", "${1}***"),
            (r"(?i)(x-api-key:\s*)\S+", "${1}***"),
            (r"\bsk-[A-Za-z0-9_\-]{8,}", "sk-***"),
            (r"\bAIza[0-9A-Za-z_\-]{20,}", "AIza***"),
        ]
        .into_iter()
        .map(|(p, r)| (Regex::new(p).expect("valid redaction pattern"), r))
        .collect()
    })
}

/// 既知の形式の秘密情報を *** に置き換える
pub fn redact_secrets(text: &str) -> String {
    let mut out = text.to_string();
    for (re, replacement) in patterns() {
        out = re.replace_all(&out, *replacement).into_owned();
    }
    out
}

/// 形式に関係なく、与えられたキーそのものも伏せる（短すぎる値は対象外）
pub fn redact_known(text: &str, secrets: &[&str]) -> String {
    let mut out = redact_secrets(text);
    for secret in secrets {
        let secret = secret.trim();
        if secret.len() >= 6 {
            out = out.replace(secret, MASK);
        }
    }
    out
}
