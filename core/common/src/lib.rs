//! 夢日記の共通ライブラリ
//!
//! ドメイン型・永続ストア・AI プロバイダ（夢解釈と画像生成）・アプリケーション状態・統計を提供し、
//! `diary` コマンドから使われる。外界への I/O は ports::outbound の trait 越しに行う。

/// エラーハンドリング
pub mod error;

/// ドメイン型（エントリ・設定・AI の結果）
pub mod domain;

/// Outbound ポート
pub mod ports;

/// ポートの標準実装
pub mod adapter;

/// 秘密情報のマスク
pub mod redact;

/// 夢解釈プロバイダ
pub mod llm;

/// 画像生成プロバイダ
pub mod image;

/// 永続ストア
pub mod store;

/// 夢解釈・画像生成のファサード
pub mod facade;

/// アプリケーション状態（write-through キャッシュと購読）
pub mod state;

/// 統計の集計
pub mod stats;

/// 一覧の絞り込み
pub mod search;
