#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::{ProjectConfig, ProjectInfo, S3Config, DEFAULT_ADAPTER_KEYWORD};
