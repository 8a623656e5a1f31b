use crate::adapters::gzip;
use crate::core::enrich::EnrichmentJoin;
use crate::core::generator::{account_pool, FixtureGenerator};
use crate::core::{ConfigProvider, GeneratorConfigProvider, Pipeline, RunReport, Storage};
use crate::domain::model::RoutingTable;
use crate::utils::error::{EtlError, Result};
use crate::utils::monitor::SystemMonitor;
use std::io::BufRead;

pub struct EnrichmentPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> EnrichmentPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for EnrichmentPipeline<S, C> {
    fn name(&self) -> &'static str {
        "enrich"
    }

    fn run(&self, monitor: &mut SystemMonitor) -> Result<RunReport> {
        let table = RoutingTable::load(&self.storage, self.config.routing_table_path())?;

        tracing::debug!("Opening input stream: {}", self.config.input_path());
        let mut input = gzip::reader(self.storage.open_read(self.config.input_path())?);
        // 先讀到 gzip header，格式不對就不建立輸出檔
        input
            .fill_buf()
            .map_err(|source| EtlError::InputOpenError {
                path: self.config.input_path().to_string(),
                source,
            })?;

        tracing::debug!("Creating output stream: {}", self.config.output_path());
        let mut output = gzip::writer(self.storage.create(self.config.output_path())?);

        let join = EnrichmentJoin::new(&table)
            .with_max_line_bytes(self.config.max_line_bytes())
            .with_progress_interval(self.config.progress_interval());
        let stats = join.run(input, &mut output, monitor)?;

        let (_, output_bytes) = gzip::finish(output).map_err(|source| EtlError::StreamWriteError {
            records: stats.records_written,
            source,
        })?;

        if stats.skipped() > 0 {
            tracing::warn!(
                decode_failures = stats.decode_failures,
                encode_failures = stats.encode_failures,
                "⚠️ {} records were skipped",
                stats.skipped()
            );
        }
        tracing::info!(
            lines = stats.lines_read,
            matched = stats.matched,
            defaulted = stats.defaulted,
            "Processed {} records",
            stats.records_written
        );

        Ok(RunReport {
            pipeline: self.name(),
            records: stats.records_written,
            skipped: stats.skipped(),
            output_path: self.config.output_path().to_string(),
            output_bytes,
        })
    }
}

pub struct GeneratorPipeline<S: Storage, C: GeneratorConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: GeneratorConfigProvider> GeneratorPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

impl<S: Storage, C: GeneratorConfigProvider> Pipeline for GeneratorPipeline<S, C> {
    fn name(&self) -> &'static str {
        "generate"
    }

    fn run(&self, monitor: &mut SystemMonitor) -> Result<RunReport> {
        let table = RoutingTable::load(&self.storage, self.config.routing_table_path())?;
        let accounts = account_pool(table.account_ids(), self.config.account_pool_limit());

        // 帳號池先檢查，避免留下空的輸出檔
        let mut generator = FixtureGenerator::new(accounts, self.config.seed())?
            .with_target_size_bytes(self.config.target_size_bytes())
            .with_check_interval(self.config.check_interval())
            .with_progress_every(self.config.progress_every());
        tracing::info!(
            "Loaded {} account IDs from routing table",
            generator.accounts().len()
        );

        let mut output = gzip::writer(self.storage.create(self.config.output_path())?);
        let stats = generator.generate(&mut output, monitor)?;

        let (_, output_bytes) = gzip::finish(output).map_err(|source| EtlError::StreamWriteError {
            records: stats.records,
            source,
        })?;

        tracing::info!("Generated {} records", stats.records);

        Ok(RunReport {
            pipeline: self.name(),
            records: stats.records,
            skipped: 0,
            output_path: self.config.output_path().to_string(),
            output_bytes,
        })
    }
}
