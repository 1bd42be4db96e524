use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub type EcosystemName = String;

/// 單一生態系統的處理狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcosystemState {
    Pending,
    Downloading,
    Downloaded,
    Extracting,
    Done,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    DownloadFailed,
    ExtractFailed,
    Unclassified,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcosystemOutcome {
    pub name: EcosystemName,
    pub bytes_downloaded: u64,
    pub entries_extracted: usize,
    pub json_files: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedEcosystem {
    pub name: EcosystemName,
    pub reason: SkipReason,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub ecosystems_total: usize,
    pub processed: Vec<EcosystemOutcome>,
    pub skipped: Vec<SkippedEcosystem>,
    pub total_json_files: usize,
}

impl RunSummary {
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// 將執行摘要以 JSON 寫出
    pub fn write_report(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Download,
    Extract,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent<'a> {
    pub ecosystem: &'a str,
    pub phase: ProgressPhase,
    pub current: u64,
    pub total: Option<u64>,
}

impl ProgressEvent<'_> {
    pub fn percent(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => Some(self.current as f64 / total as f64 * 100.0),
            _ => None,
        }
    }
}

/// 將遠端 ecosystems.txt 內容解析為名稱列表：去除空白行，保留原順序與重複項
pub fn parse_ecosystem_list(body: &str) -> Vec<EcosystemName> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
