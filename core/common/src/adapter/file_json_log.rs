//! Log 実装: ファイルへ JSONL 追記 / stderr への要点表示 / 複数出力 / 何もしない
//!
//! ログの出力先は基本的にファイルのみ。--verbose のときだけ stderr にも出す。
//! どの実装もメッセージとフィールドの秘密情報を伏せてから書き出す。

use crate::error::Error;
use crate::ports::outbound::{FileSystem, Log, LogLevel, LogRecord};
use crate::redact::redact_secrets;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const FIELD_SUMMARY_MAX: usize = 400;

/// メッセージと文字列フィールドを伏せたコピー
fn sanitized(record: &LogRecord) -> LogRecord {
    let mut rec = record.clone();
    rec.message = redact_secrets(&rec.message);
    if let Some(fields) = rec.fields.as_mut() {
        for value in fields.values_mut() {
            if let Some(s) = value.as_str() {
                *value = serde_json::Value::String(redact_secrets(s));
            }
        }
    }
    rec
}

/// ファイルへ JSONL を追記する Log 実装
pub struct FileJsonLog {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileJsonLog {
    /// ログファイルパスへ追記する logger を生成する。
    /// 親ディレクトリが無ければ作成する（初回書き込み時）。
    pub fn new(fs: Arc<dyn FileSystem>, path: impl AsRef<Path>) -> Self {
        Self {
            fs,
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Log for FileJsonLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        let mut w = self.fs.open_append(&self.path)?;
        let line = serde_json::to_string(&sanitized(record))
            .map_err(|e| Error::parse(e.to_string()))?;
        w.write_all(line.as_bytes())
            .and_then(|_| w.write_all(b"\n"))
            .and_then(|_| w.flush())
            .map_err(|e| Error::storage(e.to_string()))?;
        Ok(())
    }
}

/// 人間向けに stderr へ 1 行で出す Log 実装（--verbose 用）
#[derive(Debug, Clone, Default)]
pub struct StderrLog;

impl Log for StderrLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        let rec = sanitized(record);
        let mut line = format!("[diary] {}: {}", rec.level.as_str(), rec.message);
        if let Some(fields) = &rec.fields {
            let summary = serde_json::Value::Object(fields.clone().into_iter().collect()).to_string();
            if summary.chars().count() > FIELD_SUMMARY_MAX {
                let truncated: String = summary.chars().take(FIELD_SUMMARY_MAX).collect();
                line.push_str(&format!(" {}... (len={})", truncated, summary.len()));
            } else {
                line.push(' ');
                line.push_str(&summary);
            }
        }
        if rec.level == LogLevel::Debug {
            line.insert_str(0, "  ");
        }
        eprintln!("{}", line);
        Ok(())
    }
}

/// 複数の Log に順に書き出す。1 つが失敗しても残りには書く（最初のエラーを返す）
pub struct MultiLog {
    sinks: Vec<Arc<dyn Log>>,
}

impl MultiLog {
    pub fn new(sinks: Vec<Arc<dyn Log>>) -> Self {
        Self { sinks }
    }
}

impl Log for MultiLog {
    fn log(&self, record: &LogRecord) -> Result<(), Error> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.log(record) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// 何も出力しない Log 実装（テスト用）
#[derive(Debug, Clone, Default)]
pub struct NoopLog;

impl Log for NoopLog {
    fn log(&self, _record: &LogRecord) -> Result<(), Error> {
        Ok(())
    }
}
