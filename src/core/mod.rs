pub mod context;
pub mod engine;
pub mod import_config;
pub mod import_stage;
pub mod summary;

pub use crate::domain::model::{Column, ColumnType, Dataset, Options};
pub use crate::domain::ports::{AdapterRegistry, Backend, DefaultAdapterSource, Summarizer};
pub use crate::utils::error::Result;
pub use context::ExecutionContext;
pub use engine::{LabeledStep, StageRunner, Step, StepReport};
pub use import_config::{ImportConfig, ImportSourceConfig};
pub use import_stage::{ImportStageBuilder, SourceStep, VerifyStep, IMPORT_STAGE, SUMMARY_KEY, VERIFY_LABEL};
pub use summary::{DatasetSummary, VariableSummarizer, VariableSummary};
