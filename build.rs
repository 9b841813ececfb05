use std::path::Path;
use std::process::Command;

const SETTINGS_FILE: &str = "config/installer.toml";

fn main() {
    // 設定ファイルが無いと include_str! で分かりにくいエラーになる
    if !Path::new(SETTINGS_FILE).exists() {
        panic!("{} is missing", SETTINGS_FILE);
    }
    println!("cargo:rerun-if-changed={}", SETTINGS_FILE);
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp());
}

fn build_timestamp() -> String {
    Command::new("date")
        .args(["+%Y-%m-%d %H:%M:%S"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}
