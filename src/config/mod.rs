#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://osv-vulnerabilities.storage.googleapis.com";
pub const DEFAULT_TARGET_ROOT: &str = "./data/osv";

/// 未指定暫存目錄時使用系統暫存區下、以 PID 區分的目錄
pub fn default_staging_dir() -> PathBuf {
    std::env::temp_dir().join(format!("osv-sync-{}", std::process::id()))
}
