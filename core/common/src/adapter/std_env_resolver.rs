//! 標準環境変数解決実装（std::env を委譲）

use crate::domain::Dirs;
use crate::error::Error;
use crate::ports::outbound::EnvResolver;
use std::env;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "dream-diary";

/// 標準環境変数解決実装
#[derive(Debug, Clone, Default)]
pub struct StdEnvResolver;

impl EnvResolver for StdEnvResolver {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn resolve_dirs(&self, home_override: Option<&Path>) -> Result<Dirs, Error> {
        if let Some(home) = home_override {
            return Ok(Dirs::new(home));
        }
        if let Some(home) = self.var("DIARY_HOME") {
            return Ok(Dirs::new(PathBuf::from(home)));
        }

        let data_base = self
            .var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                self.var("HOME")
                    .map(|h| PathBuf::from(h).join(".local").join("share"))
            })
            .ok_or_else(|| Error::configuration("HOME is not set"))?;

        Ok(Dirs::new(data_base.join(APP_DIR_NAME)))
    }
}
