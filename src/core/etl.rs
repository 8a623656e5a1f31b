use crate::core::{Pipeline, RunReport};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor_enabled: bool,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor_enabled,
        }
    }

    pub fn run(&self) -> Result<RunReport> {
        let mut monitor = SystemMonitor::new(self.monitor_enabled);
        tracing::info!("🚀 Starting {} pipeline", self.pipeline.name());
        monitor.log_stats("Start");

        let report = self.pipeline.run(&mut monitor)?;

        tracing::info!(
            "✅ {} pipeline finished: {} records, {} skipped, {} bytes written to {}",
            report.pipeline,
            report.records,
            report.skipped,
            report.output_bytes,
            report.output_path
        );
        monitor.log_final_stats();

        Ok(report)
    }
}
