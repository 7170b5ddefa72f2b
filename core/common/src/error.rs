//! エラーハンドリング
//!
//! ストア・プロバイダ・CLI で共通のエラー型。`Display` はそのままユーザーに見せるメッセージ。

use thiserror::Error as ThisError;

/// エラー型
///
/// バリアントはエラーの種類（設定不足・通信失敗・応答形式不正・保存先不可・解析失敗など）を表し、
/// 中身の文字列は利用者向けのメッセージ。
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum Error {
    /// API キー未設定など。ネットワークには一切触れていない
    #[error("{0}")]
    Configuration(String),
    /// HTTP の非 2xx、または接続自体の失敗
    #[error("{0}")]
    Transport(String),
    /// 期待した JSON / 画像データが応答に無い、または壊れている
    #[error("{0}")]
    ResponseShape(String),
    /// 永続化先にアクセスできない（容量不足・権限・ディレクトリ不在など）
    #[error("{0}")]
    StorageUnavailable(String),
    /// インポート内容や保存済みデータが JSON として解釈できない
    #[error("{0}")]
    Parse(String),
    /// 登録されていないプロバイダ
    #[error("未対応のプロバイダーです: {0}")]
    UnsupportedProvider(String),
    /// コマンドライン引数の誤り
    #[error("{0}")]
    InvalidArgument(String),
    /// 指定 ID のエントリが存在しない
    #[error("{0}")]
    NotFound(String),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn response_shape(msg: impl Into<String>) -> Self {
        Self::ResponseShape(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn unsupported_provider(name: impl Into<String>) -> Self {
        Self::UnsupportedProvider(name.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// 種類を保ったままメッセージを書き換える
    pub fn map_message(self, f: impl FnOnce(String) -> String) -> Self {
        match self {
            Self::Configuration(m) => Self::Configuration(f(m)),
            Self::Transport(m) => Self::Transport(f(m)),
            Self::ResponseShape(m) => Self::ResponseShape(f(m)),
            Self::StorageUnavailable(m) => Self::StorageUnavailable(f(m)),
            Self::Parse(m) => Self::Parse(f(m)),
            Self::UnsupportedProvider(m) => Self::UnsupportedProvider(f(m)),
            Self::InvalidArgument(m) => Self::InvalidArgument(f(m)),
            Self::NotFound(m) => Self::NotFound(f(m)),
        }
    }

    /// 使い方の誤り（usage を表示すべき）か
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// プロセス終了コード（sysexits 準拠）
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_) => 64,
            Self::Parse(_) | Self::ResponseShape(_) | Self::NotFound(_) => 65,
            Self::StorageUnavailable(_) => 69,
            Self::Transport(_) => 74,
            Self::Configuration(_) | Self::UnsupportedProvider(_) => 78,
        }
    }

    /// ログ用の種別名
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Transport(_) => "transport",
            Self::ResponseShape(_) => "response_shape",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Parse(_) => "parse",
            Self::UnsupportedProvider(_) => "unsupported_provider",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
        }
    }
}
