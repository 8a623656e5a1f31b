use super::{DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_ROUTING_TABLE_PATH};
use crate::core::enrich::{DEFAULT_MAX_LINE_BYTES, DEFAULT_PROGRESS_INTERVAL};
use crate::core::generator::{
    DEFAULT_ACCOUNT_POOL_LIMIT, DEFAULT_CHECK_INTERVAL, DEFAULT_PROGRESS_EVERY,
    DEFAULT_TARGET_SIZE_BYTES,
};
use crate::core::{ConfigProvider, GeneratorConfigProvider};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub enrich: EnrichConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    Enrich,
    Generate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub kind: PipelineKind,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub table_path: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            table_path: DEFAULT_ROUTING_TABLE_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichConfig {
    pub input_path: String,
    pub output_path: String,
    pub max_line_bytes: usize,
    pub progress_interval: u64,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            input_path: DEFAULT_INPUT_PATH.to_string(),
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    pub output_path: String,
    pub target_size_bytes: u64,
    pub check_interval: u64,
    pub progress_every: u64,
    pub account_pool_limit: usize,
    pub seed: Option<u64>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_INPUT_PATH.to_string(),
            target_size_bytes: DEFAULT_TARGET_SIZE_BYTES,
            check_interval: DEFAULT_CHECK_INTERVAL,
            progress_every: DEFAULT_PROGRESS_EVERY,
            account_pool_limit: DEFAULT_ACCOUNT_POOL_LIMIT,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub verbose: bool,
    pub log_format: LogFormat,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，找不到的變數保留原字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn kind(&self) -> PipelineKind {
        self.pipeline.kind
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }

    /// 驗證配置的合理性，只檢查實際會執行的那一段
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_path("routing.table_path", &self.routing.table_path)?;
        validation::validate_file_extensions(
            "routing.table_path",
            &[self.routing.table_path.as_str()],
            &["json"],
        )?;

        match self.pipeline.kind {
            PipelineKind::Enrich => {
                validation::validate_path("enrich.input_path", &self.enrich.input_path)?;
                validation::validate_path("enrich.output_path", &self.enrich.output_path)?;
                validation::validate_file_extensions(
                    "enrich.output_path",
                    &[self.enrich.output_path.as_str()],
                    &["gz", "gzip"],
                )?;
                validation::validate_distinct_paths(
                    "enrich.output_path",
                    &self.enrich.input_path,
                    &self.enrich.output_path,
                )?;
                validation::validate_positive_number(
                    "enrich.max_line_bytes",
                    self.enrich.max_line_bytes,
                    1,
                )?;
            }
            PipelineKind::Generate => {
                validation::validate_path("generate.output_path", &self.generate.output_path)?;
                validation::validate_file_extensions(
                    "generate.output_path",
                    &[self.generate.output_path.as_str()],
                    &["gz", "gzip"],
                )?;
                validation::validate_range(
                    "generate.target_size_bytes",
                    self.generate.target_size_bytes,
                    1,
                    u64::MAX,
                )?;
                validation::validate_range(
                    "generate.check_interval",
                    self.generate.check_interval,
                    1,
                    u64::MAX,
                )?;
                validation::validate_positive_number(
                    "generate.account_pool_limit",
                    self.generate.account_pool_limit,
                    1,
                )?;
            }
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn routing_table_path(&self) -> &str {
        &self.routing.table_path
    }

    fn input_path(&self) -> &str {
        &self.enrich.input_path
    }

    fn output_path(&self) -> &str {
        &self.enrich.output_path
    }

    fn max_line_bytes(&self) -> usize {
        self.enrich.max_line_bytes
    }

    fn progress_interval(&self) -> u64 {
        self.enrich.progress_interval
    }
}

impl GeneratorConfigProvider for TomlConfig {
    fn routing_table_path(&self) -> &str {
        &self.routing.table_path
    }

    fn output_path(&self) -> &str {
        &self.generate.output_path
    }

    fn target_size_bytes(&self) -> u64 {
        self.generate.target_size_bytes
    }

    fn check_interval(&self) -> u64 {
        self.generate.check_interval
    }

    fn progress_every(&self) -> u64 {
        self.generate.progress_every
    }

    fn account_pool_limit(&self) -> usize {
        self.generate.account_pool_limit
    }

    fn seed(&self) -> Option<u64> {
        self.generate.seed
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
