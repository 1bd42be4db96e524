use super::{default_staging_dir, DEFAULT_BASE_URL, DEFAULT_TARGET_ROOT};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "osv-sync")]
#[command(about = "Download OSV vulnerability archives and extract them per ecosystem")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, default_value = DEFAULT_TARGET_ROOT)]
    pub target_root: PathBuf,

    #[arg(long, help = "Staging directory (defaults to a per-process temp dir)")]
    pub staging_dir: Option<PathBuf>,

    #[arg(
        long = "ecosystem",
        value_delimiter = ',',
        help = "Only sync these ecosystems (skips the ecosystem list download)"
    )]
    pub ecosystems: Vec<String>,

    #[arg(long, help = "Per-request timeout in seconds (no timeout by default)")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Write a JSON run summary to this path")]
    pub report: Option<PathBuf>,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn target_root(&self) -> &Path {
        &self.target_root
    }

    fn staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(default_staging_dir)
    }

    fn ecosystems(&self) -> &[String] {
        &self.ecosystems
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_path("target_root", &self.target_root.to_string_lossy())?;
        if let Some(staging) = &self.staging_dir {
            validation::validate_path("staging_dir", &staging.to_string_lossy())?;
        }
        if let Some(timeout) = self.timeout_seconds {
            validation::validate_positive_number("timeout_seconds", timeout, 1)?;
        }
        for name in &self.ecosystems {
            validation::validate_non_empty_string("ecosystem", name)?;
        }
        Ok(())
    }
}
