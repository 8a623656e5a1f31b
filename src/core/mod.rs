pub mod enrich;
pub mod etl;
pub mod generator;
pub mod pipeline;
pub mod routing;

pub use crate::domain::model::{AuditRecord, RoutingEntry, RoutingTable};
pub use crate::domain::ports::{
    ConfigProvider, GeneratorConfigProvider, Pipeline, RunReport, Storage,
};
pub use crate::utils::error::Result;
