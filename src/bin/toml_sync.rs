use anyhow::Context;
use clap::Parser;
use osv_sync::config::toml_config::TomlConfig;
use osv_sync::core::ConfigProvider;
use osv_sync::utils::{logger, validation::Validate};
use osv_sync::{HttpSource, SyncEngine, SyncPipeline};

#[derive(Parser)]
#[command(name = "toml-sync")]
#[command(about = "OSV sync driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "osv-sync.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show what would be processed without downloading anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    if config.json_logs() {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.severity().exit_code());
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    let report_path = config.report_path().map(|p| p.to_path_buf());

    let source = match HttpSource::from_config(&config) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(e.severity().exit_code());
        }
    };
    let pipeline = SyncPipeline::new(source, config);
    let engine = SyncEngine::new_with_monitoring(pipeline, monitor_enabled);

    let summary = tokio::select! {
        result = engine.run() => result.context("OSV sync failed")?,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n⛔ Interrupted by user");
            std::process::exit(130);
        }
    };

    println!(
        "✅ Processed {}/{} ecosystem(s), {} skipped, {} JSON file(s)",
        summary.processed_count(),
        summary.ecosystems_total,
        summary.skipped_count(),
        summary.total_json_files
    );

    if let Some(path) = report_path {
        summary.write_report(&path)?;
        println!("📝 Report written to {}", path.display());
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Source: {}", config.base_url());
    println!("  Target: {}", config.target_root().display());
    println!("  Staging: {}", config.staging_dir().display());

    if config.ecosystems().is_empty() {
        println!("  Ecosystems: all (from ecosystems.txt)");
    } else {
        println!("  Ecosystems: {}", config.ecosystems().join(", "));
    }

    match config.request_timeout() {
        Some(timeout) => println!("  Request timeout: {:?}", timeout),
        None => println!("  Request timeout: none"),
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}
