//! キー・バリュー ストレージ Outbound ポート
//!
//! ストアは `dreams` / `settings` の 2 キーだけをこの trait 経由で読み書きする。
//! 値は JSON。トランザクションやインデックスは持たない。

use crate::error::Error;
use serde_json::Value;

/// ローカルのキー・バリュー保存領域
///
/// 実装は `common::adapter::FileKeyValueStorage`（キーごとの JSON ファイル）や
/// `MemoryKeyValueStorage`（テスト用）など。失敗はすべて StorageUnavailable で返す。
pub trait KeyValueStorage: Send + Sync {
    /// キーの値。未保存なら None
    fn get(&self, key: &str) -> Result<Option<Value>, Error>;
    fn set(&self, key: &str, value: &Value) -> Result<(), Error>;
    /// キーを消す（無ければ何もしない）
    fn remove(&self, key: &str) -> Result<(), Error>;
    /// 全キーを消す
    fn clear(&self) -> Result<(), Error>;
}
