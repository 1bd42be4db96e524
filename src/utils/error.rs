use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to fetch ecosystem list from {url}: {reason}")]
    ListFetch { url: String, reason: String },

    #[error("Failed to download archive for ecosystem '{ecosystem}': {reason}")]
    EcosystemDownload { ecosystem: String, reason: String },

    #[error("Invalid archive {}: {reason}", .archive.display())]
    ArchiveFormat { archive: PathBuf, reason: String },

    #[error("Ecosystem name '{name}' cannot be used as a directory name")]
    InvalidEcosystemName { name: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Archive,
    FileSystem,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 程序退出碼：Low 不視為失敗
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::ListFetch { .. } | SyncError::EcosystemDownload { .. } => {
                ErrorCategory::Network
            }
            SyncError::ArchiveFormat { .. } => ErrorCategory::Archive,
            SyncError::IoError(_) => ErrorCategory::FileSystem,
            SyncError::InvalidEcosystemName { .. } | SyncError::SerializationError(_) => {
                ErrorCategory::Data
            }
            SyncError::ConfigError { .. }
            | SyncError::ConfigValidationError { .. }
            | SyncError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SyncError::EcosystemDownload { .. } => ErrorSeverity::Medium,
            SyncError::ArchiveFormat { .. } | SyncError::InvalidEcosystemName { .. } => {
                ErrorSeverity::Low
            }
            SyncError::ListFetch { .. } | SyncError::SerializationError(_) => ErrorSeverity::High,
            SyncError::IoError(_) => ErrorSeverity::High,
            SyncError::ConfigError { .. }
            | SyncError::ConfigValidationError { .. }
            | SyncError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    /// 單一生態系統失敗時是否可以跳過並繼續
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            SyncError::ListFetch { .. }
                | SyncError::ConfigError { .. }
                | SyncError::ConfigValidationError { .. }
                | SyncError::InvalidConfigValueError { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SyncError::ListFetch { .. } => {
                "Check network connectivity and that --base-url points at an OSV bucket"
            }
            SyncError::EcosystemDownload { .. } => {
                "Re-run later or select the ecosystem explicitly with --ecosystem"
            }
            SyncError::ArchiveFormat { .. } => {
                "The archive is corrupt or truncated; re-run to download it again"
            }
            SyncError::InvalidEcosystemName { .. } => {
                "The remote ecosystem list contains an unusable name; it was skipped"
            }
            SyncError::IoError(_) => {
                "Check disk space and permissions of the target and staging directories"
            }
            SyncError::SerializationError(_) => "Check that the report path is writable",
            SyncError::ConfigError { .. }
            | SyncError::ConfigValidationError { .. }
            | SyncError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::ListFetch { url, .. } => {
                format!("Could not download the ecosystem list ({})", url)
            }
            SyncError::EcosystemDownload { ecosystem, .. } => {
                format!("Could not download advisories for {}", ecosystem)
            }
            SyncError::ArchiveFormat { archive, .. } => {
                format!("Archive {} could not be extracted", archive.display())
            }
            SyncError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration for {}: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
