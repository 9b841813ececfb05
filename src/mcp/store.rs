use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::error::{InstallerError, Result};
use crate::mcp::ClaudeConfig;

pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !fs::try_exists(parent).await.unwrap_or(false) {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| InstallerError::io("failed to create", parent, e))?;
            }
        }
        Ok(())
    }

    /// ファイルが無い・壊れている場合は空の設定を返す
    pub async fn load(&self) -> ClaudeConfig {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = %err, "config not readable, using empty config");
                return ClaudeConfig::default();
            }
        };
        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(document)) => ClaudeConfig::from_document(document),
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "config root is not an object, using empty config");
                ClaudeConfig::default()
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "config is not valid JSON, using empty config");
                ClaudeConfig::default()
            }
        }
    }

    pub async fn save(&self, config: &ClaudeConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config)?;
        let target = self.write_target().await;
        let tmp = temp_path(&target);
        if let Err(err) = write_temp(&tmp, &target, content.as_bytes()).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(InstallerError::io("failed to write", &tmp, err));
        }
        if let Err(err) = fs::rename(&tmp, &target).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(InstallerError::io("failed to replace", &target, err));
        }
        tracing::debug!(path = %self.path.display(), target = %target.display(), "config saved");
        Ok(())
    }

    /// シンボリックリンクの場合はリンク先を置き換える
    async fn write_target(&self) -> PathBuf {
        if let Ok(real) = fs::canonicalize(&self.path).await {
            return real;
        }
        // リンク切れ
        match fs::read_link(&self.path).await {
            Ok(link) => match self.path.parent() {
                Some(parent) => parent.join(link),
                None => link,
            },
            Err(_) => self.path.clone(),
        }
    }
}

fn temp_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config.json".to_string());
    target.with_file_name(format!(".{}.{}.tmp", name, Uuid::new_v4()))
}

async fn write_temp(tmp: &Path, target: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    // トークンを含むので既存ファイルのパーミッションを先に引き継ぐ
    if let Ok(meta) = fs::metadata(target).await {
        file.set_permissions(meta.permissions()).await?;
    }
    file.write_all(content).await?;
    file.sync_all().await?;
    Ok(())
}
