//! Ports & Adapters のポート定義
//!
//! - inbound: ドライバ（CLI）がアプリを呼び出す口
//! - outbound: common::ports::outbound を使う（diary 固有のものは無い）

pub mod inbound;
