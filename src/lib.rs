pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::HttpSource;
pub use config::toml_config::TomlConfig;
pub use core::{engine::SyncEngine, pipeline::SyncPipeline};
pub use domain::model::{parse_ecosystem_list, RunSummary, SkipReason};
pub use utils::error::{Result, SyncError};
