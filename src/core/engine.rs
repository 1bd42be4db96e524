use crate::core::Pipeline;
use crate::domain::model::RunSummary;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct SyncEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> SyncEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("🚀 Starting OSV sync...");
        self.monitor.log_stats("Start");

        let result = self.pipeline.run().await;

        self.monitor.log_stats("Finish");
        let summary = result?;
        tracing::info!(
            "Sync finished in {}s",
            (summary.finished_at - summary.started_at).num_seconds()
        );
        Ok(summary)
    }
}
