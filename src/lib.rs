pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ProjectConfig;

pub use crate::adapters::{file_adapter, s3_adapter, Adapter, InMemoryRegistry};
pub use crate::core::{
    Dataset, ExecutionContext, ImportConfig, ImportSourceConfig, ImportStageBuilder, LabeledStep,
    StageRunner,
};
pub use utils::error::{ImportError, Result};
