use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::{InstallerError, Result};

/// ベアラートークンの入力元
#[async_trait::async_trait]
pub trait TokenPrompt: Send + Sync {
    async fn ask(&self, server_name: &str) -> Result<String>;
}

/// 標準入力から1行読む
pub struct StdinPrompt;

#[async_trait::async_trait]
impl TokenPrompt for StdinPrompt {
    async fn ask(&self, server_name: &str) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        let question = format!("Enter your bearer token for {}: ", server_name);
        stdout
            .write_all(question.as_bytes())
            .await
            .map_err(InstallerError::Prompt)?;
        stdout.flush().await.map_err(InstallerError::Prompt)?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(InstallerError::Prompt)?;
        Ok(line.trim().to_string())
    }
}
