// Config module
// インストーラー設定（ビルド時に埋め込み）

use serde::Deserialize;
use url::Url;

use crate::error::{InstallerError, Result};

const EMBEDDED_SETTINGS: &str = include_str!("../../config/installer.toml");

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub cli_name: String,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServerSettings {
    /// mcpServers のキー
    pub name: String,
    pub launch: LaunchShape,
}

/// 登録するエントリの起動形式（デプロイごとに一つ）
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "shape", rename_all = "kebab-case")]
pub enum LaunchShape {
    RemoteProxy { endpoint: String },
    LocalProcess { package: String },
}

impl Settings {
    pub fn embedded() -> Result<Self> {
        Self::from_toml(EMBEDDED_SETTINGS)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| InstallerError::Settings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn usage(&self) -> String {
        format!("Usage: npx {} [install|uninstall|status]", self.cli_name)
    }

    fn validate(&self) -> Result<()> {
        if self.cli_name.trim().is_empty() {
            return Err(InstallerError::Settings("cli_name is empty".to_string()));
        }
        if self.server.name.trim().is_empty() {
            return Err(InstallerError::Settings("server.name is empty".to_string()));
        }
        match &self.server.launch {
            LaunchShape::RemoteProxy { endpoint } => {
                let url = Url::parse(endpoint).map_err(|e| {
                    InstallerError::Settings(format!("invalid endpoint {}: {}", endpoint, e))
                })?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(InstallerError::Settings(format!(
                        "endpoint must be http(s): {}",
                        endpoint
                    )));
                }
            }
            LaunchShape::LocalProcess { package } => {
                if package.trim().is_empty() {
                    return Err(InstallerError::Settings(
                        "server.launch.package is empty".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}
