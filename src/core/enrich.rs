//! Streaming enrichment join.
//!
//! Reads NDJSON lines one at a time, resolves each record's
//! `recipientAccountId` against the routing table and writes the record back
//! out with a `lookup_target_pipeline` field. Only one input line and one
//! output line are buffered at any time, and both buffers are reused.
//!
//! Malformed lines are reported and skipped. Read errors, over-long lines and
//! write errors abort the run.

use crate::domain::model::{AuditRecord, Lookup, RoutingTable};
use crate::utils::error::{EtlError, RecordError, Result};
use crate::utils::monitor::SystemMonitor;
use std::io::{BufRead, Read, Write};

/// 單行長度上限
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    pub lines_read: u64,
    pub records_written: u64,
    pub decode_failures: u64,
    pub encode_failures: u64,
    pub matched: u64,
    pub defaulted: u64,
}

impl JoinStats {
    pub fn skipped(&self) -> u64 {
        self.decode_failures + self.encode_failures
    }
}

pub struct EnrichmentJoin<'a> {
    table: &'a RoutingTable,
    max_line_bytes: usize,
    progress_interval: u64,
}

impl<'a> EnrichmentJoin<'a> {
    pub fn new(table: &'a RoutingTable) -> Self {
        Self {
            table,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    /// 0 表示不輸出進度
    pub fn with_progress_interval(mut self, progress_interval: u64) -> Self {
        self.progress_interval = progress_interval;
        self
    }

    /// 為單筆記錄補上 `lookup_target_pipeline`，已存在的值直接覆寫
    pub fn enrich(&self, record: &mut AuditRecord) -> Lookup<'a> {
        let lookup = self.table.resolve(record.join_key());
        record.set_lookup_target_pipeline(lookup.target_pipeline());
        lookup
    }

    /// 解碼、補欄位、序列化到 `out`。錯誤只影響這一行。
    pub fn process_line(
        &self,
        line: &[u8],
        out: &mut Vec<u8>,
    ) -> std::result::Result<Lookup<'a>, RecordError> {
        let mut record = AuditRecord::from_line(line)?;
        let lookup = self.enrich(&mut record);
        record.write_line(out)?;
        Ok(lookup)
    }

    pub fn run<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        writer: &mut W,
        monitor: &mut SystemMonitor,
    ) -> Result<JoinStats> {
        let mut stats = JoinStats::default();
        let mut line = Vec::with_capacity(8 * 1024);
        let mut out = Vec::with_capacity(8 * 1024);
        // 多留兩個 byte 給行尾的 \r\n
        let limit = (self.max_line_bytes as u64).saturating_add(2);

        loop {
            line.clear();
            let line_number = stats.lines_read + 1;

            let read = reader
                .by_ref()
                .take(limit)
                .read_until(b'\n', &mut line)
                .map_err(|source| EtlError::StreamReadError {
                    line: line_number,
                    source,
                })?;
            if read == 0 {
                break;
            }
            let content = trim_line_ending(&line);
            if content.len() > self.max_line_bytes {
                return Err(EtlError::LineTooLong {
                    line: line_number,
                    limit: self.max_line_bytes,
                });
            }
            stats.lines_read = line_number;

            match self.process_line(content, &mut out) {
                Ok(lookup) => {
                    writer
                        .write_all(&out)
                        .map_err(|source| EtlError::StreamWriteError {
                            records: stats.records_written,
                            source,
                        })?;

                    stats.records_written += 1;
                    if lookup.is_match() {
                        stats.matched += 1;
                    } else {
                        stats.defaulted += 1;
                    }

                    if self.progress_interval > 0
                        && stats.records_written % self.progress_interval == 0
                    {
                        tracing::info!("Processed {} records", stats.records_written);
                        monitor.log_stats("Enrichment");
                    }
                }
                Err(err) => {
                    match err {
                        RecordError::Encode(_) => stats.encode_failures += 1,
                        RecordError::Decode(_) | RecordError::NotAnObject(_) => {
                            stats.decode_failures += 1
                        }
                    }
                    tracing::warn!(line = line_number, "⚠️ Skipping record: {}", err);
                }
            }
        }

        Ok(stats)
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
