use crate::core::extract::{count_json_files, count_json_files_recursive, ArchiveExtractor};
use crate::core::progress::LogProgress;
use crate::core::staging::{StagedFile, StagingArea};
use crate::domain::model::{
    parse_ecosystem_list, EcosystemName, EcosystemOutcome, EcosystemState, RunSummary,
    SkipReason, SkippedEcosystem,
};
use crate::domain::ports::{AdvisorySource, ConfigProvider, Pipeline, ProgressReporter};
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::validate_ecosystem_name;
use chrono::Utc;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tracing::{debug, info, warn};

/// 逐一下載並解壓各生態系統的 OSV 漏洞資料
pub struct SyncPipeline<S: AdvisorySource, C: ConfigProvider> {
    source: S,
    config: C,
    progress: Arc<dyn ProgressReporter>,
}

impl<S: AdvisorySource, C: ConfigProvider> SyncPipeline<S, C> {
    pub fn new(source: S, config: C) -> Self {
        Self {
            source,
            config,
            progress: Arc::new(LogProgress),
        }
    }

    pub fn with_progress(mut self, progress: impl ProgressReporter + 'static) -> Self {
        self.progress = Arc::new(progress);
        self
    }

    /// 決定本次要處理的生態系統：明確指定時直接使用，否則下載 ecosystems.txt
    async fn resolve_ecosystems(&self, staging: &StagingArea) -> Result<Vec<EcosystemName>> {
        let selected = self.config.ecosystems();
        if !selected.is_empty() {
            info!("🎯 Using {} configured ecosystem(s)", selected.len());
            return Ok(selected.to_vec());
        }

        info!("📡 Fetching ecosystem list...");
        let body = self.source.fetch_ecosystem_list().await?;

        let list_path = staging.list_path();
        fs::write(&list_path, &body)?;
        debug!("Ecosystem list staged at {}", list_path.display());

        let ecosystems = parse_ecosystem_list(&fs::read_to_string(&list_path)?);
        info!(
            "Found {} ecosystem(s): {}",
            ecosystems.len(),
            ecosystems.join(", ")
        );
        Ok(ecosystems)
    }

    async fn sync_all(
        &self,
        staging: &StagingArea,
    ) -> Result<(usize, Vec<EcosystemOutcome>, Vec<SkippedEcosystem>)> {
        let ecosystems = self.resolve_ecosystems(staging).await?;

        let total = ecosystems.len();
        let mut processed = Vec::new();
        let mut skipped = Vec::new();

        for (i, ecosystem) in ecosystems.iter().enumerate() {
            info!("[{}/{}] Processing ecosystem: {}", i + 1, total, ecosystem);
            transition(ecosystem, EcosystemState::Pending);

            match self.process_ecosystem(ecosystem, staging).await {
                Ok(outcome) => processed.push(outcome),
                Err(err) => {
                    let reason = skip_reason(&err);
                    warn!("  ⚠️ Skipping {}: {}", ecosystem, err);
                    transition(ecosystem, EcosystemState::Skipped(reason));
                    skipped.push(SkippedEcosystem {
                        name: ecosystem.clone(),
                        reason,
                        message: err.to_string(),
                    });
                }
            }
        }

        Ok((total, processed, skipped))
    }

    /// 處理單一生態系統。暫存的壓縮檔在函式返回時一律刪除
    pub async fn process_ecosystem(
        &self,
        ecosystem: &str,
        staging: &StagingArea,
    ) -> Result<EcosystemOutcome> {
        validate_ecosystem_name(ecosystem)?;

        let target_dir = self.config.target_root().join(ecosystem);
        fs::create_dir_all(&target_dir)?;

        let staged = StagedFile::new(staging.archive_path(ecosystem));

        transition(ecosystem, EcosystemState::Downloading);
        let bytes_downloaded = self
            .source
            .download_archive(ecosystem, staged.path(), self.progress.as_ref())
            .await?;
        transition(ecosystem, EcosystemState::Downloaded);
        info!(
            "  Download complete: {} ({} bytes)",
            staged.path().display(),
            bytes_downloaded
        );

        transition(ecosystem, EcosystemState::Extracting);
        let (entries_extracted, json_files) = self
            .extract_blocking(ecosystem, staged.path(), &target_dir)
            .await?;
        transition(ecosystem, EcosystemState::Done);
        info!(
            "  Extracted to {} ({} JSON advisory file(s))",
            target_dir.display(),
            json_files
        );

        Ok(EcosystemOutcome {
            name: ecosystem.to_string(),
            bytes_downloaded,
            entries_extracted,
            json_files,
        })
    }

    /// 解壓在 blocking 執行緒進行，避免長時間佔住 runtime（例如 Ctrl-C 監聽）
    async fn extract_blocking(
        &self,
        ecosystem: &str,
        archive_path: &Path,
        target_dir: &Path,
    ) -> Result<(usize, usize)> {
        let archive = archive_path.to_path_buf();
        let target = target_dir.to_path_buf();
        let name = ecosystem.to_string();
        let progress = Arc::clone(&self.progress);

        spawn_blocking(move || {
            let written =
                ArchiveExtractor::extract(&archive, &target, &name, progress.as_ref())?;
            Ok::<_, SyncError>((written, count_json_files(&target)))
        })
        .await
        .map_err(|e| SyncError::ArchiveFormat {
            archive: archive_path.to_path_buf(),
            reason: format!("extraction task failed: {}", e),
        })?
    }
}

fn transition(ecosystem: &str, state: EcosystemState) {
    debug!(ecosystem, ?state, "ecosystem state changed");
}

fn skip_reason(err: &SyncError) -> SkipReason {
    match err {
        SyncError::EcosystemDownload { .. } => SkipReason::DownloadFailed,
        SyncError::ArchiveFormat { .. } => SkipReason::ExtractFailed,
        _ => SkipReason::Unclassified,
    }
}

#[async_trait::async_trait]
impl<S: AdvisorySource, C: ConfigProvider> Pipeline for SyncPipeline<S, C> {
    async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let target_root = self.config.target_root();
        fs::create_dir_all(target_root)?;
        info!("Target directory: {}", target_root.display());

        let staging = StagingArea::create(self.config.staging_dir())?;
        info!("Staging directory: {}", staging.root().display());

        // 致命錯誤時也先清理暫存目錄
        let result = self.sync_all(&staging).await;
        let cleanup = staging.finish();
        let (total, processed, skipped) = result?;
        if let Err(e) = cleanup {
            warn!("Failed to clean up staging directory: {}", e);
        }

        let total_json_files = count_json_files_recursive(target_root);
        info!(
            "✅ Processed {}/{} ecosystem(s), {} skipped, {} JSON file(s) under {}",
            processed.len(),
            total,
            skipped.len(),
            total_json_files,
            target_root.display()
        );

        Ok(RunSummary {
            started_at,
            finished_at: Utc::now(),
            ecosystems_total: total,
            processed,
            skipped,
            total_json_files,
        })
    }
}
