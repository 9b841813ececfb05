// Error module
// インストーラーのエラー分類

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallerError {
    /// 入力値の検証エラー（空のトークンなど）
    #[error("{0}")]
    Validation(String),

    #[error("cannot determine home directory")]
    HomeDirectory,

    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read token: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid installer settings: {0}")]
    Settings(String),
}

impl InstallerError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, InstallerError>;
