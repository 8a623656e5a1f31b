use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::io::{Read, Write};

/// 檔案存取。壓縮格式不在這一層處理，只負責開檔與建檔。
pub trait Storage {
    type Reader: Read;
    type Writer: Write;

    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn open_read(&self, path: &str) -> Result<Self::Reader>;
    fn create(&self, path: &str) -> Result<Self::Writer>;
}

pub trait ConfigProvider {
    fn routing_table_path(&self) -> &str;
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn max_line_bytes(&self) -> usize;
    fn progress_interval(&self) -> u64;
}

pub trait GeneratorConfigProvider {
    fn routing_table_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn target_size_bytes(&self) -> u64;
    fn check_interval(&self) -> u64;
    fn progress_every(&self) -> u64;
    fn account_pool_limit(&self) -> usize;
    fn seed(&self) -> Option<u64>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub pipeline: &'static str,
    pub records: u64,
    pub skipped: u64,
    pub output_path: String,
    pub output_bytes: u64,
}

pub trait Pipeline {
    fn name(&self) -> &'static str;
    fn run(&self, monitor: &mut SystemMonitor) -> Result<RunReport>;
}
