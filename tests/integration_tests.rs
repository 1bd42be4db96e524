use anyhow::Result;
use httpmock::prelude::*;
use osv_sync::core::progress::NoProgress;
use osv_sync::core::Pipeline;
use osv_sync::{CliConfig, HttpSource, SkipReason, SyncEngine, SyncError, SyncPipeline};
use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn zip_fixture(files: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in files {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn test_config(server: &MockServer, temp_dir: &TempDir) -> CliConfig {
    CliConfig {
        base_url: server.base_url(),
        target_root: temp_dir.path().join("osv"),
        staging_dir: Some(temp_dir.path().join("staging")),
        ecosystems: vec![],
        timeout_seconds: Some(10),
        report: None,
        json_logs: false,
        verbose: false,
        monitor: false,
    }
}

fn pipeline_for(config: CliConfig) -> SyncPipeline<HttpSource, CliConfig> {
    let source = HttpSource::from_config(&config).unwrap();
    SyncPipeline::new(source, config).with_progress(NoProgress)
}

fn files_under(root: &Path) -> BTreeSet<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().strip_prefix(root).unwrap().to_path_buf())
        .collect()
}

#[tokio::test]
async fn test_end_to_end_sync_with_fake_server() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start_async().await;

    let list_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/ecosystems.txt");
            then.status(200).body("npm\nPyPI\n");
        })
        .await;
    let npm_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/npm/all.zip");
            then.status(200)
                .header("Content-Type", "application/zip")
                .body(zip_fixture(&[("GHSA-1.json", r#"{"id":"GHSA-1"}"#)]));
        })
        .await;
    let pypi_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/PyPI/all.zip");
            then.status(200)
                .header("Content-Type", "application/zip")
                .body(zip_fixture(&[("GHSA-2.json", r#"{"id":"GHSA-2"}"#)]));
        })
        .await;

    let config = test_config(&server, &temp_dir);
    let engine = SyncEngine::new(pipeline_for(config));
    let summary = engine.run().await?;

    list_mock.assert_async().await;
    npm_mock.assert_async().await;
    pypi_mock.assert_async().await;

    let root = temp_dir.path().join("osv");
    assert_eq!(
        std::fs::read_to_string(root.join("npm/GHSA-1.json"))?,
        r#"{"id":"GHSA-1"}"#
    );
    assert!(root.join("PyPI/GHSA-2.json").exists());
    assert!(!root.join("PyPI/GHSA-1.json").exists());
    assert!(!root.join("npm/GHSA-2.json").exists());

    let staging = temp_dir.path().join("staging");
    assert!(!staging.join("npm-all.zip").exists());
    assert!(!staging.join("PyPI-all.zip").exists());
    assert!(!staging.exists());

    assert_eq!(summary.processed_count(), 2);
    assert_eq!(summary.skipped_count(), 0);
    assert_eq!(summary.total_json_files, 2);
    Ok(())
}

#[tokio::test]
async fn test_download_failure_does_not_affect_neighbours() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/ecosystems.txt");
            then.status(200).body("A\nB\nC\n");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/A/all.zip");
            then.status(200).body(zip_fixture(&[("A-1.json", "{}")]));
        })
        .await;
    let failing_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/B/all.zip");
            then.status(500);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/C/all.zip");
            then.status(200).body(zip_fixture(&[("C-1.json", "{}")]));
        })
        .await;

    let summary = pipeline_for(test_config(&server, &temp_dir)).run().await?;

    failing_mock.assert_async().await;
    let root = temp_dir.path().join("osv");
    assert!(root.join("A/A-1.json").exists());
    assert!(root.join("C/C-1.json").exists());

    assert_eq!(summary.processed_count(), 2);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].name, "B");
    assert_eq!(summary.skipped[0].reason, SkipReason::DownloadFailed);
    assert!(summary.skipped[0].message.contains("500"));
    Ok(())
}

#[tokio::test]
async fn test_timeout_is_a_per_ecosystem_failure() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/ecosystems.txt");
            then.status(200).body("A\nB\nC\n");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/A/all.zip");
            then.status(200).body(zip_fixture(&[("A-1.json", "{}")]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/B/all.zip");
            then.status(200)
                .delay(Duration::from_secs(3))
                .body(zip_fixture(&[("B-1.json", "{}")]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/C/all.zip");
            then.status(200).body(zip_fixture(&[("C-1.json", "{}")]));
        })
        .await;

    let mut config = test_config(&server, &temp_dir);
    config.timeout_seconds = Some(1);
    let summary = pipeline_for(config).run().await?;

    let root = temp_dir.path().join("osv");
    assert!(root.join("A/A-1.json").exists());
    assert!(root.join("C/C-1.json").exists());
    assert!(!root.join("B/B-1.json").exists());

    assert_eq!(summary.processed_count(), 2);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].name, "B");
    assert_eq!(summary.skipped[0].reason, SkipReason::DownloadFailed);
    assert!(!temp_dir.path().join("staging").exists());
    Ok(())
}

#[tokio::test]
async fn test_corrupt_archive_is_skipped_and_cleaned_up() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/ecosystems.txt");
            then.status(200).body("A\n");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/A/all.zip");
            then.status(200).body("PK\u{3}\u{4} definitely not a complete archive");
        })
        .await;

    let summary = pipeline_for(test_config(&server, &temp_dir)).run().await?;

    assert_eq!(summary.processed_count(), 0);
    assert_eq!(summary.skipped[0].reason, SkipReason::ExtractFailed);
    assert!(!temp_dir.path().join("staging/A-all.zip").exists());
    assert!(!temp_dir.path().join("staging").exists());
    Ok(())
}

#[tokio::test]
async fn test_rerun_is_idempotent() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/ecosystems.txt");
            then.status(200).body("npm\n\nPyPI\n");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/npm/all.zip");
            then.status(200).body(zip_fixture(&[
                ("GHSA-1.json", r#"{"id":"GHSA-1"}"#),
                ("GHSA-3.json", r#"{"id":"GHSA-3"}"#),
            ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/PyPI/all.zip");
            then.status(200)
                .body(zip_fixture(&[("PYSEC-1.json", r#"{"id":"PYSEC-1"}"#)]));
        })
        .await;

    let root = temp_dir.path().join("osv");

    pipeline_for(test_config(&server, &temp_dir)).run().await?;
    let first = files_under(&root);

    let summary = pipeline_for(test_config(&server, &temp_dir)).run().await?;
    let second = files_under(&root);

    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
    assert_eq!(summary.total_json_files, 3);
    assert_eq!(
        std::fs::read_to_string(root.join("npm/GHSA-3.json"))?,
        r#"{"id":"GHSA-3"}"#
    );
    Ok(())
}

#[tokio::test]
async fn test_ecosystem_list_failure_aborts_run() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/ecosystems.txt");
            then.status(500);
        })
        .await;
    let archive_mock = server
        .mock_async(|when, then| {
            when.method(GET).path_contains("/all.zip");
            then.status(200);
        })
        .await;

    let result = pipeline_for(test_config(&server, &temp_dir)).run().await;

    match result {
        Err(SyncError::ListFetch { reason, .. }) => assert!(reason.contains("500")),
        other => panic!("expected list fetch error, got {:?}", other.map(|_| ())),
    }
    assert_eq!(archive_mock.hits_async().await, 0);
    assert!(!temp_dir.path().join("staging").exists());
    Ok(())
}

#[tokio::test]
async fn test_selected_ecosystem_skips_list_download() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start_async().await;

    let list_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/ecosystems.txt");
            then.status(200).body("npm\nMaven\n");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/Maven/all.zip");
            then.status(200)
                .body(zip_fixture(&[("GHSA-maven.json", r#"{"id":"GHSA-maven"}"#)]));
        })
        .await;

    let mut config = test_config(&server, &temp_dir);
    config.ecosystems = vec!["Maven".to_string()];
    let report = temp_dir.path().join("report.json");

    let summary = pipeline_for(config).run().await?;
    summary.write_report(&report)?;

    assert_eq!(list_mock.hits_async().await, 0);
    assert!(temp_dir.path().join("osv/Maven/GHSA-maven.json").exists());
    assert!(!temp_dir.path().join("osv/npm").exists());

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report)?)?;
    assert_eq!(value["processed"][0]["name"], "Maven");
    assert_eq!(value["total_json_files"], 1);
    Ok(())
}
