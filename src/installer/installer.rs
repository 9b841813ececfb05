// Installer module
// Claude Desktop 設定へのインストール／アンインストール／状態確認

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{InstallerError, Result};
use crate::installer::{build_entry, NpmLocator, PackageLocator, TokenPrompt};
use crate::mcp::{resolve_config_path, ConfigStore, ServerEntry};

#[derive(Debug, Clone)]
pub struct InstallReport {
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninstallOutcome {
    Removed,
    NotInstalled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerStatus {
    /// 保存済みエントリが読めない場合は `None`
    Installed(Option<ServerEntry>),
    NotInstalled,
}

pub struct Installer {
    settings: Settings,
    store: ConfigStore,
    locator: Box<dyn PackageLocator>,
}

impl Installer {
    pub fn new(settings: Settings) -> Result<Self> {
        let path = resolve_config_path()?;
        Ok(Self::with_parts(settings, path, Box::new(NpmLocator)))
    }

    pub fn with_parts(
        settings: Settings,
        config_path: PathBuf,
        locator: Box<dyn PackageLocator>,
    ) -> Self {
        Self {
            settings,
            store: ConfigStore::new(config_path),
            locator,
        }
    }

    pub fn server_name(&self) -> &str {
        &self.settings.server.name
    }

    pub fn config_path(&self) -> &Path {
        self.store.path()
    }

    pub async fn install(&self, prompt: &dyn TokenPrompt) -> Result<InstallReport> {
        let token = prompt.ask(self.server_name()).await?;
        let token = token.trim();
        if token.is_empty() {
            return Err(InstallerError::Validation(
                "Bearer token is required".to_string(),
            ));
        }

        self.store.ensure_dir().await?;
        let mut config = self.store.load().await;
        let entry = build_entry(&self.settings.server.launch, self.locator.as_ref(), token).await;
        config.set_server(self.server_name(), &entry)?;
        self.store.save(&config).await?;

        tracing::info!(server = self.server_name(), command = %entry.command, "server installed");
        Ok(InstallReport {
            config_path: self.config_path().to_path_buf(),
        })
    }

    pub async fn uninstall(&self) -> Result<UninstallOutcome> {
        let mut config = self.store.load().await;
        if !config.contains_server(self.server_name()) {
            return Ok(UninstallOutcome::NotInstalled);
        }
        config.remove_server(self.server_name());
        self.store.save(&config).await?;
        tracing::info!(server = self.server_name(), "server uninstalled");
        Ok(UninstallOutcome::Removed)
    }

    pub async fn status(&self) -> ServerStatus {
        let config = self.store.load().await;
        match config.server_entry(self.server_name()) {
            None => ServerStatus::NotInstalled,
            Some(Ok(entry)) => ServerStatus::Installed(Some(entry)),
            Some(Err(err)) => {
                tracing::warn!(server = self.server_name(), error = %err, "stored entry is unreadable");
                ServerStatus::Installed(None)
            }
        }
    }
}
