//! 配線: 標準アダプタで DiaryUseCase を組み立てる

use std::path::Path;
use std::sync::Arc;

use common::adapter::{
    FileJsonLog, FileKeyValueStorage, MultiLog, ReqwestHttpClient, StdClock, StdEnvResolver,
    StdFileSystem, StdIdGenerator, StderrLog,
};
use common::domain::Dirs;
use common::error::Error;
use common::facade::AiFacade;
use common::ports::outbound::{
    Clock, EnvResolver, FileSystem, HttpClient, IdGenerator, KeyValueStorage, Log,
};
use common::store::DreamStore;

use crate::usecase::app::DiaryUseCase;

/// main（Runner）が使う依存の束
pub struct App {
    pub use_case: DiaryUseCase,
    pub logger: Arc<dyn Log>,
    pub fs: Arc<dyn FileSystem>,
}

/// 差し替え可能な外部依存（テストではメモリ KV やスタブ HTTP を渡す）
pub struct Deps {
    pub fs: Arc<dyn FileSystem>,
    pub storage: Arc<dyn KeyValueStorage>,
    pub http: Arc<dyn HttpClient>,
    pub env: Arc<dyn EnvResolver>,
    pub clock: Arc<dyn Clock>,
    pub id_gen: Arc<dyn IdGenerator>,
    pub logger: Arc<dyn Log>,
}

/// 依存から App を組み立てる
pub fn wire_with(deps: Deps) -> App {
    let store = Arc::new(DreamStore::new(
        Arc::clone(&deps.storage),
        Arc::clone(&deps.clock),
        Arc::clone(&deps.logger),
    ));
    let facade = AiFacade::with_default_providers(deps.http, Arc::clone(&deps.logger));
    let use_case = DiaryUseCase::new(
        store,
        facade,
        deps.clock,
        deps.id_gen,
        deps.env,
        Arc::clone(&deps.fs),
        Arc::clone(&deps.logger),
    );
    App {
        use_case,
        logger: deps.logger,
        fs: deps.fs,
    }
}

/// 配線: データディレクトリを解決し、標準アダプタで App を組み立てる
///
/// ログは `<data>/logs/diary.jsonl` に追記し、verbose のときは stderr にも出す。
pub fn wire_diary(home: Option<&Path>, verbose: bool) -> Result<App, Error> {
    let env: Arc<dyn EnvResolver> = Arc::new(StdEnvResolver);
    let dirs: Dirs = env.resolve_dirs(home)?;
    let fs: Arc<dyn FileSystem> = Arc::new(StdFileSystem);
    let clock: Arc<dyn Clock> = Arc::new(StdClock);

    let mut sinks: Vec<Arc<dyn Log>> = vec![Arc::new(FileJsonLog::new(Arc::clone(&fs), dirs.log_file()))];
    if verbose {
        sinks.push(Arc::new(StderrLog));
    }
    let logger: Arc<dyn Log> = Arc::new(MultiLog::new(sinks));

    Ok(wire_with(Deps {
        storage: Arc::new(FileKeyValueStorage::new(Arc::clone(&fs), dirs.storage_dir())),
        http: Arc::new(ReqwestHttpClient::new()),
        id_gen: Arc::new(StdIdGenerator::new(Arc::clone(&clock))),
        fs,
        env,
        clock,
        logger,
    }))
}
