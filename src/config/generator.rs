use super::{DEFAULT_INPUT_PATH, DEFAULT_ROUTING_TABLE_PATH};
use crate::core::generator::{
    DEFAULT_ACCOUNT_POOL_LIMIT, DEFAULT_CHECK_INTERVAL, DEFAULT_PROGRESS_EVERY,
};
use crate::core::GeneratorConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "generate_test_data")]
#[command(about = "Generate synthetic gzip NDJSON CloudTrail records for enrichment tests")]
pub struct GeneratorCliConfig {
    #[arg(long, default_value = DEFAULT_ROUTING_TABLE_PATH)]
    pub routing_table: String,

    // 產生的檔案就是 enrichment 的預設輸入
    #[arg(long, default_value = DEFAULT_INPUT_PATH)]
    pub output: String,

    #[arg(long, default_value_t = 5.0, help = "Target compressed size in MB")]
    pub target_size_mb: f64,

    #[arg(
        long,
        default_value_t = DEFAULT_CHECK_INTERVAL,
        help = "Measure output size every N records"
    )]
    pub check_interval: u64,

    #[arg(long, default_value_t = DEFAULT_PROGRESS_EVERY)]
    pub progress_every: u64,

    #[arg(long, default_value_t = DEFAULT_ACCOUNT_POOL_LIMIT)]
    pub account_pool_limit: usize,

    #[arg(long, help = "Seed for reproducible output")]
    pub seed: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage while generating")]
    pub monitor: bool,
}

impl GeneratorConfigProvider for GeneratorCliConfig {
    fn routing_table_path(&self) -> &str {
        &self.routing_table
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn target_size_bytes(&self) -> u64 {
        (self.target_size_mb * 1024.0 * 1024.0).round() as u64
    }

    fn check_interval(&self) -> u64 {
        self.check_interval
    }

    fn progress_every(&self) -> u64 {
        self.progress_every
    }

    fn account_pool_limit(&self) -> usize {
        self.account_pool_limit
    }

    fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl Validate for GeneratorCliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("routing_table", &self.routing_table)?;
        validation::validate_path("output", &self.output)?;
        validation::validate_file_extensions("output", &[self.output.as_str()], &["gz", "gzip"])?;
        validation::validate_range("target_size_mb", self.target_size_mb, 0.001, 100_000.0)?;
        validation::validate_positive_number("check_interval", self.check_interval as usize, 1)?;
        validation::validate_positive_number("account_pool_limit", self.account_pool_limit, 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_defaults() {
        let config = GeneratorCliConfig::parse_from(["generate_test_data"]);
        assert_eq!(config.output_path(), "test-data.ndjson.gz");
        assert_eq!(config.target_size_bytes(), 5 * 1024 * 1024);
        assert_eq!(config.check_interval(), 100);
        assert_eq!(config.account_pool_limit(), 20);
        assert_eq!(config.seed(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_check_interval_is_rejected() {
        let config =
            GeneratorCliConfig::parse_from(["generate_test_data", "--check-interval", "0"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fractional_target_size() {
        let config = GeneratorCliConfig::parse_from([
            "generate_test_data",
            "--target-size-mb",
            "0.5",
            "--seed",
            "9",
        ]);
        assert_eq!(config.target_size_bytes(), 512 * 1024);
        assert_eq!(config.seed(), Some(9));
    }
}
