pub mod engine;
pub mod extract;
pub mod pipeline;
pub mod progress;
pub mod staging;

pub use crate::domain::model::{EcosystemOutcome, RunSummary, SkipReason, SkippedEcosystem};
pub use crate::domain::ports::{AdvisorySource, ConfigProvider, Pipeline, ProgressReporter};
pub use crate::utils::error::Result;
