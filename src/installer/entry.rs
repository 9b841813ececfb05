// Entry module
// mcpServers に書き込むエントリの生成

use anyhow::{anyhow, Result};
use serde_json::Map;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::process::Command;

use crate::config::LaunchShape;
use crate::mcp::ServerEntry;

pub const BEARER_TOKEN_ENV: &str = "BEARER_TOKEN";

/// グローバル node_modules の場所を探す
#[async_trait::async_trait]
pub trait PackageLocator: Send + Sync {
    async fn global_root(&self) -> Result<PathBuf>;
}

/// `npm root -g` で取得
pub struct NpmLocator;

#[async_trait::async_trait]
impl PackageLocator for NpmLocator {
    async fn global_root(&self) -> Result<PathBuf> {
        let npm = if cfg!(windows) { "npm.cmd" } else { "npm" };
        let output = Command::new(npm).args(["root", "-g"]).output().await?;
        if !output.status.success() {
            return Err(anyhow!("npm root -g exited with {}", output.status));
        }
        let root = String::from_utf8(output.stdout)?.trim().to_string();
        if root.is_empty() {
            return Err(anyhow!("npm root -g printed nothing"));
        }
        Ok(PathBuf::from(root))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalLaunch {
    /// グローバルインストール済みパッケージを `node <script>` で起動
    Node(PathBuf),
    /// フォールバック: `npx <package>`
    Npx(String),
}

pub async fn resolve_local_launch(locator: &dyn PackageLocator, package: &str) -> LocalLaunch {
    let root = match locator.global_root().await {
        Ok(root) => root,
        Err(err) => {
            tracing::debug!(error = %err, "global package root not found, falling back to npx");
            return LocalLaunch::Npx(package.to_string());
        }
    };
    let script = root.join(package).join("dist").join("index.js");
    if tokio::fs::try_exists(&script).await.unwrap_or(false) {
        tracing::debug!(script = %script.display(), "using globally installed package");
        LocalLaunch::Node(script)
    } else {
        tracing::debug!(script = %script.display(), "package not installed globally, falling back to npx");
        LocalLaunch::Npx(package.to_string())
    }
}

pub fn remote_proxy_entry(endpoint: &str, token: &str) -> ServerEntry {
    ServerEntry {
        command: "npx".to_string(),
        args: Some(vec![
            "mcp-remote".to_string(),
            endpoint.to_string(),
            "--header".to_string(),
            format!("Authorization: Bearer {}", token),
        ]),
        env: Some(BTreeMap::new()),
        extra: Map::new(),
    }
}

pub fn local_process_entry(launch: LocalLaunch, token: &str) -> ServerEntry {
    let (command, args) = match launch {
        LocalLaunch::Node(script) => ("node", vec![script.to_string_lossy().into_owned()]),
        LocalLaunch::Npx(package) => ("npx", vec![package]),
    };
    ServerEntry {
        command: command.to_string(),
        args: Some(args),
        env: Some(BTreeMap::from([(
            BEARER_TOKEN_ENV.to_string(),
            token.to_string(),
        )])),
        extra: Map::new(),
    }
}

pub async fn build_entry(
    shape: &LaunchShape,
    locator: &dyn PackageLocator,
    token: &str,
) -> ServerEntry {
    match shape {
        LaunchShape::RemoteProxy { endpoint } => remote_proxy_entry(endpoint, token),
        LaunchShape::LocalProcess { package } => {
            let launch = resolve_local_launch(locator, package).await;
            local_process_entry(launch, token)
        }
    }
}
