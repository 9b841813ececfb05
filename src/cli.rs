use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::process::ExitCode;

use crate::config::Settings;
use crate::installer::{Installer, ServerStatus, StdinPrompt, UninstallOutcome};
use crate::mcp::ServerEntry;

#[derive(Parser, Debug)]
#[command(
    name = "mcp-installer",
    version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_TIMESTAMP"), ")"),
    about = "Claude Desktop に MCP サーバーを登録するインストーラー",
    long_about = None
)]
pub struct Cli {
    /// サブコマンド
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// MCPサーバーを登録（トークン入力あり）
    Install,

    /// MCPサーバーを削除
    Uninstall,

    /// 登録状況を表示
    Status,
}

pub async fn run() -> Result<ExitCode> {
    let settings = Settings::embedded()?;
    parse_args(std::env::args_os()).execute(settings).await
}

/// 第1引数のみ解釈し、以降は無視する。解釈できなければサブコマンドなし扱い
pub fn parse_args<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args.into_iter().take(2)) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            tracing::debug!(error = %err, "unrecognized arguments");
            Cli { command: None }
        }
    }
}

impl Cli {
    pub async fn execute(self, settings: Settings) -> Result<ExitCode> {
        let Some(command) = self.command else {
            println!("{}", settings.usage());
            return Ok(ExitCode::FAILURE);
        };
        let installer = Installer::new(settings)?;
        match command {
            Commands::Install => execute_install(&installer).await?,
            Commands::Uninstall => execute_uninstall(&installer).await?,
            Commands::Status => execute_status(&installer).await,
        }
        Ok(ExitCode::SUCCESS)
    }
}

async fn execute_install(installer: &Installer) -> Result<()> {
    let name = installer.server_name();
    println!("Installing {} MCP Server...", name);
    let report = installer.install(&StdinPrompt).await?;
    println!("✅ {} MCP Server installed successfully!", name);
    println!("Config saved to: {}", report.config_path.display());
    println!("\nRestart Claude Desktop to use the new server.");
    Ok(())
}

async fn execute_uninstall(installer: &Installer) -> Result<()> {
    let name = installer.server_name();
    println!("Uninstalling {} MCP Server...", name);
    match installer.uninstall().await? {
        UninstallOutcome::Removed => {
            println!("✅ {} MCP Server uninstalled successfully!", name)
        }
        UninstallOutcome::NotInstalled => println!("{} MCP Server is not installed.", name),
    }
    Ok(())
}

async fn execute_status(installer: &Installer) {
    let status = installer.status().await;
    for line in format_status(installer.server_name(), &status) {
        println!("{}", line);
    }
}

fn format_status(name: &str, status: &ServerStatus) -> Vec<String> {
    match status {
        ServerStatus::NotInstalled => vec![format!("{} MCP Server: ❌ NOT INSTALLED", name)],
        ServerStatus::Installed(entry) => {
            let mut lines = vec![format!("{} MCP Server: ✅ INSTALLED", name)];
            match entry {
                Some(entry) => lines.extend(format_entry(&entry.redacted())),
                None => lines.push("Command: <unreadable entry>".to_string()),
            }
            lines
        }
    }
}

fn format_entry(entry: &ServerEntry) -> Vec<String> {
    let mut lines = vec![format!("Command: {}", entry.command)];
    if let Some(args) = &entry.args {
        lines.push(format!("Args: {}", serde_json::Value::from(args.clone())));
    }
    if let Some(env) = &entry.env {
        let env: serde_json::Map<String, serde_json::Value> = env
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::from(v.as_str())))
            .collect();
        lines.push(format!("Env: {}", serde_json::Value::Object(env)));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::{local_process_entry, remote_proxy_entry, LocalLaunch};

    #[test]
    fn parses_subcommands() {
        let cli = parse_args(["mcp-installer", "status"]);
        assert_eq!(cli.command, Some(Commands::Status));
        let cli = parse_args(["mcp-installer"]);
        assert_eq!(cli.command, None);
    }

    #[test]
    fn unknown_command_falls_back_to_usage() {
        assert_eq!(parse_args(["mcp-installer", "reinstall"]).command, None);
        assert_eq!(parse_args(["mcp-installer", "--bogus"]).command, None);
    }

    #[test]
    fn trailing_arguments_are_ignored() {
        let cli = parse_args(["mcp-installer", "install", "extra", "--force"]);
        assert_eq!(cli.command, Some(Commands::Install));
    }

    #[tokio::test]
    async fn missing_command_exits_with_failure() {
        let settings = Settings::embedded().unwrap();
        let code = Cli { command: None }.execute(settings).await.unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn unknown_command_exits_with_failure() {
        let settings = Settings::embedded().unwrap();
        let code = parse_args(["mcp-installer", "reinstall"])
            .execute(settings)
            .await
            .unwrap();
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn status_not_installed() {
        assert_eq!(
            format_status("Demo", &ServerStatus::NotInstalled),
            ["Demo MCP Server: ❌ NOT INSTALLED"]
        );
    }

    #[test]
    fn status_masks_header_token() {
        let entry = remote_proxy_entry("https://example.com/sse", "abc123");
        let lines = format_status("Demo", &ServerStatus::Installed(Some(entry)));
        assert_eq!(
            lines,
            [
                "Demo MCP Server: ✅ INSTALLED",
                "Command: npx",
                r#"Args: ["mcp-remote","https://example.com/sse","--header","Authorization: Bearer ***"]"#,
                "Env: {}",
            ]
        );
    }

    #[test]
    fn status_masks_env_token() {
        let entry = local_process_entry(LocalLaunch::Npx("demo-mcp".to_string()), "abc123");
        let lines = format_status("Demo", &ServerStatus::Installed(Some(entry)));
        assert_eq!(lines[1], "Command: npx");
        assert_eq!(lines[2], r#"Args: ["demo-mcp"]"#);
        assert_eq!(lines[3], r#"Env: {"BEARER_TOKEN":"***"}"#);
    }

    #[test]
    fn status_unreadable_entry() {
        let lines = format_status("Demo", &ServerStatus::Installed(None));
        assert_eq!(lines[1], "Command: <unreadable entry>");
    }
}
