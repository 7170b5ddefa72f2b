//! 実行時ディレクトリ（DIARY_HOME / XDG 解決結果）
//!
//! EnvResolver::resolve_dirs() で取得し、ストレージ・ログのパス計算に使う。

use std::path::PathBuf;

/// 解決済みのデータディレクトリ
#[derive(Debug, Clone)]
pub struct Dirs {
    pub data_dir: PathBuf,
}

impl Dirs {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// キーごとの JSON を置くディレクトリ（data/storage）
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }

    /// ログ格納ディレクトリ（data/logs）
    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// JSONL ログファイル
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join("diary.jsonl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_layout() {
        let dirs = Dirs::new("/tmp/diary");
        assert_eq!(dirs.storage_dir(), PathBuf::from("/tmp/diary/storage"));
        assert_eq!(dirs.log_file(), PathBuf::from("/tmp/diary/logs/diary.jsonl"));
    }
}
