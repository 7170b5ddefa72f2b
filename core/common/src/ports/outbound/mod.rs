//! Outbound ポート: アプリが外界（FS・時刻・ID・ログ・KV ストレージ・HTTP・環境変数）を使うための trait

pub mod clock;
pub mod env_resolver;
pub mod fs;
pub mod http_client;
pub mod id_generator;
pub mod kv_storage;
pub mod log;

pub use clock::Clock;
pub use env_resolver::EnvResolver;
pub use fs::{FileMetadata, FileSystem};
pub use http_client::{HttpBody, HttpClient, HttpRequest, HttpResponse};
pub use id_generator::IdGenerator;
pub use kv_storage::KeyValueStorage;
pub use log::{now_iso8601, Log, LogLevel, LogRecord};
