pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, GeneratorCliConfig};

pub use crate::adapters::storage::LocalStorage;
pub use crate::config::toml_config::TomlConfig;
pub use crate::core::{
    enrich::{EnrichmentJoin, JoinStats},
    etl::EtlEngine,
    generator::FixtureGenerator,
    pipeline::{EnrichmentPipeline, GeneratorPipeline},
};
pub use crate::domain::model::{AuditRecord, RoutingEntry, RoutingTable, DEFAULT_PIPELINE};
pub use crate::utils::error::{EtlError, RecordError, Result};
