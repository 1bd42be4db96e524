use crate::core::progress::ProgressTracker;
use crate::domain::model::ProgressPhase;
use crate::domain::ports::{AdvisorySource, ConfigProvider, ProgressReporter};
use crate::utils::error::{Result, SyncError};
use reqwest::Client;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use url::Url;

/// 以 HTTP 從 OSV 物件儲存下載資料
pub struct HttpSource {
    client: Client,
    base_url: Url,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_client(base_url, Client::new())
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| SyncError::ConfigError {
            message: format!("failed to build HTTP client: {}", e),
        })?;
        Self::with_client(config.base_url(), client)
    }

    pub fn with_client(base_url: &str, client: Client) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| SyncError::InvalidConfigValueError {
            field: "base_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::InvalidConfigValueError {
                field: "base_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }
        Ok(Self { client, base_url })
    }

    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn ecosystem_list_url(&self) -> Url {
        self.url_for(&["ecosystems.txt"])
    }

    /// `{base}/{ecosystem}/all.zip`，名稱中的空白等字元會被百分比編碼
    pub fn archive_url(&self, ecosystem: &str) -> Url {
        self.url_for(&[ecosystem, "all.zip"])
    }
}

#[async_trait::async_trait]
impl AdvisorySource for HttpSource {
    async fn fetch_ecosystem_list(&self) -> Result<String> {
        let url = self.ecosystem_list_url();
        tracing::debug!("Making request to: {}", url);

        let list_error = |reason: String| SyncError::ListFetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| list_error(e.to_string()))?;

        tracing::debug!("Ecosystem list response status: {}", response.status());
        if !response.status().is_success() {
            return Err(list_error(format!("HTTP {}", response.status())));
        }

        response.text().await.map_err(|e| list_error(e.to_string()))
    }

    async fn download_archive(
        &self,
        ecosystem: &str,
        dest: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<u64> {
        let url = self.archive_url(ecosystem);
        tracing::debug!("Downloading archive from: {}", url);

        let download_error = |reason: String| SyncError::EcosystemDownload {
            ecosystem: ecosystem.to_string(),
            reason,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        if !response.status().is_success() {
            return Err(download_error(format!("HTTP {}", response.status())));
        }

        let mut tracker = ProgressTracker::new(
            progress,
            ecosystem,
            ProgressPhase::Download,
            response.content_length(),
        );
        let mut file = File::create(dest)?;

        // 逐塊寫入，不將整個壓縮檔保留在記憶體中
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| download_error(e.to_string()))?
        {
            file.write_all(&chunk)?;
            tracker.advance(chunk.len() as u64);
        }
        file.flush()?;

        Ok(tracker.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::progress::NoProgress;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_archive_url_encodes_names() {
        let source = HttpSource::new("https://osv.example.com").unwrap();
        assert_eq!(
            source.archive_url("npm").as_str(),
            "https://osv.example.com/npm/all.zip"
        );
        assert_eq!(
            source.archive_url("GitHub Actions").as_str(),
            "https://osv.example.com/GitHub%20Actions/all.zip"
        );
    }

    #[test]
    fn test_base_url_with_path_prefix() {
        let source = HttpSource::new("http://127.0.0.1:9000/mirror/osv/").unwrap();
        assert_eq!(
            source.ecosystem_list_url().as_str(),
            "http://127.0.0.1:9000/mirror/osv/ecosystems.txt"
        );
        assert_eq!(
            source.archive_url("PyPI").as_str(),
            "http://127.0.0.1:9000/mirror/osv/PyPI/all.zip"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpSource::new("not a url").is_err());
        assert!(HttpSource::new("mailto:osv@example.com").is_err());

        // 設定錯誤以退出碼 3 結束
        match HttpSource::new("not a url") {
            Err(err) => assert_eq!(err.severity().exit_code(), 3),
            Ok(_) => panic!("invalid base URL accepted"),
        }
    }

    #[tokio::test]
    async fn test_fetch_ecosystem_list_success() {
        let server = MockServer::start_async().await;
        let list_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/ecosystems.txt");
                then.status(200).body("npm\nPyPI\n");
            })
            .await;

        let source = HttpSource::new(&server.base_url()).unwrap();
        let body = source.fetch_ecosystem_list().await.unwrap();

        list_mock.assert_async().await;
        assert_eq!(body, "npm\nPyPI\n");
    }

    #[tokio::test]
    async fn test_fetch_ecosystem_list_failure_is_list_fetch_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/ecosystems.txt");
                then.status(503);
            })
            .await;

        let source = HttpSource::new(&server.base_url()).unwrap();
        let err = source.fetch_ecosystem_list().await.unwrap_err();

        assert!(matches!(err, SyncError::ListFetch { .. }));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_download_archive_streams_to_file() {
        let server = MockServer::start_async().await;
        let payload = vec![7u8; 64 * 1024];
        let body = payload.clone();
        server
            .mock_async(move |when, then| {
                when.method(GET).path("/Maven/all.zip");
                then.status(200)
                    .header("Content-Type", "application/zip")
                    .body(body);
            })
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("Maven-all.zip");
        let source = HttpSource::new(&server.base_url()).unwrap();

        let written = source
            .download_archive("Maven", &dest, &NoProgress)
            .await
            .unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), payload);
    }

    #[tokio::test]
    async fn test_download_archive_http_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/npm/all.zip");
                then.status(500);
            })
            .await;

        let temp = TempDir::new().unwrap();
        let source = HttpSource::new(&server.base_url()).unwrap();
        let err = source
            .download_archive("npm", &temp.path().join("npm-all.zip"), &NoProgress)
            .await
            .unwrap_err();

        match err {
            SyncError::EcosystemDownload { ecosystem, reason } => {
                assert_eq!(ecosystem, "npm");
                assert!(reason.contains("500"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
