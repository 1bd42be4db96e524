use crate::core::progress::ProgressTracker;
use crate::domain::model::ProgressPhase;
use crate::domain::ports::ProgressReporter;
use crate::utils::error::{Result, SyncError};
use std::fs::{self, File};
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// ZIP 漏洞資料解壓器
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    /// 將 `archive_path` 解壓至 `target_dir`，保留壓縮檔內的相對路徑。
    /// 回傳寫出的檔案數量。
    pub fn extract(
        archive_path: &Path,
        target_dir: &Path,
        ecosystem: &str,
        progress: &dyn ProgressReporter,
    ) -> Result<usize> {
        debug!(?archive_path, ?target_dir, "extracting ZIP archive");

        fs::create_dir_all(target_dir)?;

        let file = File::open(archive_path)?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| SyncError::ArchiveFormat {
            archive: archive_path.to_path_buf(),
            reason: format!("failed to read ZIP archive: {}", e),
        })?;

        let total = archive.len();
        let mut tracker =
            ProgressTracker::new(progress, ecosystem, ProgressPhase::Extract, Some(total as u64));
        let mut written = 0;

        for i in 0..total {
            let mut entry = archive.by_index(i).map_err(|e| SyncError::ArchiveFormat {
                archive: archive_path.to_path_buf(),
                reason: format!("failed to read ZIP entry {}: {}", i, e),
            })?;

            let Some(relative) = entry.enclosed_name() else {
                warn!(entry = entry.name(), "skipping entry with unsafe path");
                tracker.advance(1);
                continue;
            };
            let out_path = target_dir.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&out_path)?;
            } else {
                if let Some(parent) = out_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                // File::create 會覆寫既有檔案，重複執行結果一致
                let mut outfile = File::create(&out_path)?;
                std::io::copy(&mut entry, &mut outfile).map_err(|e| match e.kind() {
                    ErrorKind::InvalidData | ErrorKind::UnexpectedEof => {
                        SyncError::ArchiveFormat {
                            archive: archive_path.to_path_buf(),
                            reason: format!("corrupt entry '{}': {}", out_path.display(), e),
                        }
                    }
                    _ => SyncError::IoError(e),
                })?;
                written += 1;
            }

            tracker.advance(1);
        }

        debug!(?archive_path, written, "ZIP extraction finished");
        Ok(written)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// 計算目錄下（不含子目錄）的 JSON 檔數量
pub fn count_json_files(dir: &Path) -> usize {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_json(entry.path()))
        .count()
}

pub fn count_json_files_recursive(root: &Path) -> usize {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_json(entry.path()))
        .count()
}
