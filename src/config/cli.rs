use crate::utils::error::Result;
use crate::utils::validation::{validate_keyword, validate_file_path, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "data-import")]
#[command(about = "Load a dataset from the first data source that works")]
pub struct CliConfig {
    /// Path to the project TOML configuration
    #[arg(short, long, default_value = "import.toml")]
    pub config: String,

    /// Override the project's default adapter keyword
    #[arg(long)]
    pub default_adapter: Option<String>,

    /// Write the loaded dataset to this path through the file adapter
    #[arg(long)]
    pub export: Option<String>,

    /// Write the variable summaries as JSON to this path
    #[arg(long)]
    pub summary_output: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_file_path("config", &self.config)?;

        if let Some(keyword) = &self.default_adapter {
            validate_keyword("default_adapter", keyword)?;
        }
        if let Some(path) = &self.export {
            validate_file_path("export", path)?;
        }
        if let Some(path) = &self.summary_output {
            validate_file_path("summary_output", path)?;
        }
        Ok(())
    }
}
