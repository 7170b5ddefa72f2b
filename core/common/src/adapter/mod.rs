//! アダプター（外界の I/O を trait で抽象化した標準実装）
//!
//! ストア・ファサード・usecase は ports::outbound の trait 経由でのみファイル・時刻・HTTP に触れる。
//! ここには標準実装（Std* / File* / Reqwest*）とテスト用のメモリ実装を置く。

pub mod file_json_log;
pub mod file_kv_storage;
pub mod memory_kv_storage;
pub mod reqwest_http;
pub mod std_clock;
pub mod std_env_resolver;
pub mod std_fs;
pub mod std_id_generator;

pub use file_json_log::{FileJsonLog, MultiLog, NoopLog, StderrLog};
pub use file_kv_storage::FileKeyValueStorage;
pub use memory_kv_storage::MemoryKeyValueStorage;
pub use reqwest_http::ReqwestHttpClient;
pub use std_clock::StdClock;
pub use std_env_resolver::StdEnvResolver;
pub use std_fs::StdFileSystem;
pub use std_id_generator::StdIdGenerator;
