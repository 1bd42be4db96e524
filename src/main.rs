use clap::Parser;
use osv_sync::utils::{logger, validation::Validate};
use osv_sync::{CliConfig, HttpSource, SyncEngine, SyncPipeline};

const INTERRUPTED_EXIT_CODE: i32 = 130;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting osv-sync CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.severity().exit_code());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let report_path = config.report.clone();
    let source = match HttpSource::from_config(&config) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("❌ Failed to build HTTP client: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.severity().exit_code());
        }
    };
    let pipeline = SyncPipeline::new(source, config);
    let engine = SyncEngine::new_with_monitoring(pipeline, monitor_enabled);

    let result = tokio::select! {
        result = engine.run() => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("⛔ Interrupted by user");
            eprintln!("\n⛔ Interrupted by user");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    };

    match result {
        Ok(summary) => {
            println!(
                "✅ Processed {}/{} ecosystem(s), {} skipped",
                summary.processed_count(),
                summary.ecosystems_total,
                summary.skipped_count()
            );
            for skipped in &summary.skipped {
                println!("   ⚠️ {} ({:?}): {}", skipped.name, skipped.reason, skipped.message);
            }
            println!("📁 {} JSON advisory file(s) in total", summary.total_json_files);

            if let Some(path) = report_path {
                summary.write_report(&path)?;
                println!("📝 Report written to {}", path.display());
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Sync failed: {} (Category: {:?}, Severity: {:?}, Recoverable: {})",
                e,
                e.category(),
                e.severity(),
                e.is_recoverable()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = e.severity().exit_code();

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
