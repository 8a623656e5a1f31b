#[cfg(feature = "cli")]
pub mod generator;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use generator::GeneratorCliConfig;

#[cfg(feature = "cli")]
use crate::core::enrich::{DEFAULT_MAX_LINE_BYTES, DEFAULT_PROGRESS_INTERVAL};
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROUTING_TABLE_PATH: &str = "aws-routing.json";
pub const DEFAULT_INPUT_PATH: &str = "test-data.ndjson.gz";
pub const DEFAULT_OUTPUT_PATH: &str = "test-data.rust-output.ndjson.gz";

/// 不帶任何參數即可執行，預設路徑就是固定慣例
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "trail-enrich")]
#[command(about = "Enrich gzip NDJSON audit logs with routing metadata")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_ROUTING_TABLE_PATH)]
    pub routing_table: String,

    #[arg(long, default_value = DEFAULT_INPUT_PATH)]
    pub input: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output: String,

    #[arg(long, default_value_t = DEFAULT_MAX_LINE_BYTES)]
    pub max_line_bytes: usize,

    #[arg(
        long,
        default_value_t = DEFAULT_PROGRESS_INTERVAL,
        help = "Log progress every N records (0 disables)"
    )]
    pub progress_interval: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage while processing")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn routing_table_path(&self) -> &str {
        &self.routing_table
    }

    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output
    }

    fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }

    fn progress_interval(&self) -> u64 {
        self.progress_interval
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("routing_table", &self.routing_table)?;
        validation::validate_path("input", &self.input)?;
        validation::validate_path("output", &self.output)?;
        validation::validate_file_extensions(
            "routing_table",
            &[self.routing_table.as_str()],
            &["json"],
        )?;
        validation::validate_file_extensions("output", &[self.output.as_str()], &["gz", "gzip"])?;
        validation::validate_distinct_paths("output", &self.input, &self.output)?;
        validation::validate_positive_number("max_line_bytes", self.max_line_bytes, 1)?;
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_fixed_conventions() {
        let config = CliConfig::parse_from(["trail-enrich"]);
        assert_eq!(config.routing_table_path(), "aws-routing.json");
        assert_eq!(config.input_path(), "test-data.ndjson.gz");
        assert_eq!(config.output_path(), "test-data.rust-output.ndjson.gz");
        assert_eq!(config.max_line_bytes(), 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_must_differ_from_input() {
        let config = CliConfig::parse_from([
            "trail-enrich",
            "--input",
            "same.ndjson.gz",
            "--output",
            "same.ndjson.gz",
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_routing_table_must_be_json() {
        let config = CliConfig::parse_from(["trail-enrich", "--routing-table", "routing.csv"]);
        assert!(config.validate().is_err());
    }
}
