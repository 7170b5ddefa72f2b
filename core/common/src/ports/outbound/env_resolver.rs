//! 環境変数解決 Outbound ポート
//!
//! データディレクトリと API キーのフォールバックを環境変数から解決する。
//! usecase はこの trait 経由でのみ環境変数にアクセスする。

use crate::domain::Dirs;
use crate::error::Error;
use std::path::Path;

/// 環境変数解決抽象（Outbound ポート）
///
/// 実装は `common::adapter::StdEnvResolver` やテスト用のモックなど。
pub trait EnvResolver: Send + Sync {
    /// 環境変数の値（未設定・空文字は None）
    fn var(&self, name: &str) -> Option<String>;

    /// データディレクトリを解決する
    ///
    /// 優先順位:
    /// 1. 引数 home_override（CLI の --home）
    /// 2. DIARY_HOME
    /// 3. $XDG_DATA_HOME/dream-diary
    /// 4. $HOME/.local/share/dream-diary
    fn resolve_dirs(&self, home_override: Option<&Path>) -> Result<Dirs, Error>;
}
