use crate::domain::model::{ProgressEvent, ProgressPhase};
use crate::domain::ports::ProgressReporter;

const UNKNOWN_TOTAL_STEP: u64 = 1024 * 1024;

/// 將進度節流為整數百分比的變化（總量未知時每 1 MiB 一次）
pub struct ProgressTracker<'a> {
    reporter: &'a dyn ProgressReporter,
    ecosystem: &'a str,
    phase: ProgressPhase,
    total: Option<u64>,
    current: u64,
    last_step: Option<u64>,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(
        reporter: &'a dyn ProgressReporter,
        ecosystem: &'a str,
        phase: ProgressPhase,
        total: Option<u64>,
    ) -> Self {
        Self {
            reporter,
            ecosystem,
            phase,
            total: total.filter(|t| *t > 0),
            current: 0,
            last_step: None,
        }
    }

    pub fn advance(&mut self, amount: u64) {
        self.current += amount;

        let step = match self.total {
            Some(total) => self.current.min(total) * 100 / total,
            None => self.current / UNKNOWN_TOTAL_STEP,
        };

        if self.last_step != Some(step) {
            self.last_step = Some(step);
            self.reporter.report(&ProgressEvent {
                ecosystem: self.ecosystem,
                phase: self.phase,
                current: self.current,
                total: self.total,
            });
        }
    }

    pub fn current(&self) -> u64 {
        self.current
    }
}

/// 透過 tracing 輸出進度
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: &ProgressEvent<'_>) {
        let unit = match event.phase {
            ProgressPhase::Download => "bytes",
            ProgressPhase::Extract => "files",
        };
        let label = match event.phase {
            ProgressPhase::Download => "⬇️ download",
            ProgressPhase::Extract => "📦 extract",
        };

        match (event.percent(), event.total) {
            (Some(percent), Some(total)) => tracing::info!(
                "  {} {}: {:.1}% ({}/{} {})",
                label,
                event.ecosystem,
                percent,
                event.current,
                total,
                unit
            ),
            _ => tracing::info!("  {} {}: {} {}", label, event.ecosystem, event.current, unit),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: &ProgressEvent<'_>) {}
}
