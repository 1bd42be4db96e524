use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

const LIST_FILE_NAME: &str = "ecosystems.txt";

/// 單次執行專用的暫存目錄
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::debug!("Staging directory ready: {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn list_path(&self) -> PathBuf {
        self.root.join(LIST_FILE_NAME)
    }

    pub fn archive_path(&self, ecosystem: &str) -> PathBuf {
        self.root.join(format!("{}-all.zip", ecosystem))
    }

    /// 刪除生態系統列表檔，暫存目錄為空時一併刪除。回傳目錄是否已刪除
    pub fn finish(self) -> Result<bool> {
        let list_path = self.list_path();
        if list_path.exists() {
            fs::remove_file(&list_path)?;
            tracing::debug!("Removed {}", list_path.display());
        }

        if !self.root.exists() {
            return Ok(true);
        }

        if fs::read_dir(&self.root)?.next().is_none() {
            fs::remove_dir(&self.root)?;
            tracing::info!("🧹 Staging directory removed: {}", self.root.display());
            Ok(true)
        } else {
            tracing::warn!(
                "Staging directory not empty, leaving it in place: {}",
                self.root.display()
            );
            Ok(false)
        }
    }
}

/// 暫存檔守衛：離開作用域時一律刪除檔案，不論處理成功與否
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("🗑️ Temporary archive removed: {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                "Failed to remove temporary file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
