use std::path::{Path, PathBuf};

use crate::error::{InstallerError, Result};

pub const CONFIG_FILE_NAME: &str = "claude_desktop_config.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Other
        }
    }
}

/// ホームディレクトリ基準の Claude Desktop 設定ファイルの場所
pub fn config_path_for(platform: Platform, home: &Path) -> PathBuf {
    let dir = match platform {
        Platform::MacOs => home
            .join("Library")
            .join("Application Support")
            .join("Claude"),
        Platform::Windows => home.join("AppData").join("Roaming").join("Claude"),
        Platform::Other => home.join(".config").join("claude"),
    };
    dir.join(CONFIG_FILE_NAME)
}

pub fn resolve_config_path() -> Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or(InstallerError::HomeDirectory)?;
    let path = config_path_for(Platform::current(), &home);
    tracing::debug!(path = %path.display(), "resolved claude desktop config path");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macos_path() {
        let path = config_path_for(Platform::MacOs, Path::new("/Users/ann"));
        assert_eq!(
            path,
            PathBuf::from("/Users/ann/Library/Application Support/Claude/claude_desktop_config.json")
        );
    }

    #[test]
    fn windows_path() {
        let path = config_path_for(Platform::Windows, Path::new("home"));
        assert_eq!(
            path,
            Path::new("home")
                .join("AppData")
                .join("Roaming")
                .join("Claude")
                .join("claude_desktop_config.json")
        );
    }

    #[test]
    fn other_path_is_lowercase_claude() {
        let path = config_path_for(Platform::Other, Path::new("/home/ann"));
        assert_eq!(
            path,
            PathBuf::from("/home/ann/.config/claude/claude_desktop_config.json")
        );
    }
}
