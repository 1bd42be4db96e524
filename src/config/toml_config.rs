use super::{default_staging_dir, DEFAULT_BASE_URL, DEFAULT_TARGET_ROOT};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub filter: Option<FilterConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_target_root")]
    pub target_root: PathBuf,
    pub staging_dir: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub ecosystems: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_target_root() -> PathBuf {
    PathBuf::from(DEFAULT_TARGET_ROOT)
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            target_root: default_target_root(),
            staging_dir: None,
            report_path: None,
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${OSV_MIRROR})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn report_path(&self) -> Option<&Path> {
        self.output.report_path.as_deref()
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        &self.source.base_url
    }

    fn target_root(&self) -> &Path {
        &self.output.target_root
    }

    fn staging_dir(&self) -> PathBuf {
        self.output
            .staging_dir
            .clone()
            .unwrap_or_else(default_staging_dir)
    }

    fn ecosystems(&self) -> &[String] {
        self.filter
            .as_ref()
            .map(|f| f.ecosystems.as_slice())
            .unwrap_or(&[])
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("source.base_url", &self.source.base_url)?;
        validation::validate_path(
            "output.target_root",
            &self.output.target_root.to_string_lossy(),
        )?;
        if let Some(staging) = &self.output.staging_dir {
            validation::validate_path("output.staging_dir", &staging.to_string_lossy())?;
        }
        if let Some(timeout) = self.source.timeout_seconds {
            validation::validate_positive_number("source.timeout_seconds", timeout, 1)?;
        }
        for name in self.ecosystems() {
            validation::validate_non_empty_string("filter.ecosystems", name)?;
        }
        Ok(())
    }
}
