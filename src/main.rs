use std::process::ExitCode;

mod cli;
mod config;
mod error;
mod installer;
mod mcp;

#[tokio::main]
async fn main() -> ExitCode {
    // ログ初期化（stdout はユーザー向け出力専用）
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
        )
        .init();

    // 実行
    match cli::run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
