use crate::domain::model::{ProgressEvent, RunSummary};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn target_root(&self) -> &Path;
    fn staging_dir(&self) -> PathBuf;
    /// 明確指定的生態系統；非空時不下載 ecosystems.txt
    fn ecosystems(&self) -> &[String];
    fn request_timeout(&self) -> Option<Duration>;
}

/// 遠端漏洞資料來源
#[async_trait]
pub trait AdvisorySource: Send + Sync {
    async fn fetch_ecosystem_list(&self) -> Result<String>;

    /// 將生態系統的 all.zip 串流寫入 `dest`，回傳寫入的位元組數
    async fn download_archive(
        &self,
        ecosystem: &str,
        dest: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<u64>;
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: &ProgressEvent<'_>);
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn run(&self) -> Result<RunSummary>;
}
