use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("No resource given for adapter '{keyword}': set one of resource, file, filename, name or path")]
    MissingResource { keyword: String },

    #[error("Resource for adapter '{keyword}' must be a string, got {actual}")]
    InvalidResourceType { actual: String, keyword: String },

    #[error("Missing dependency {dependency}: {guidance}")]
    MissingDependency { dependency: String, guidance: String },

    #[error("No adapter registered for keyword '{keyword}'")]
    NotFound { keyword: String },

    #[error("Failed to load data from all data sources")]
    DataLoadExhausted,

    #[error("Dataset has already been loaded for this run")]
    DatasetAlreadyLoaded,

    #[error("Invalid option '{option}': {reason}")]
    InvalidOption { option: String, reason: String },

    #[error("Object store error: {message}")]
    ObjectStore { message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

impl ImportError {
    /// 給使用者的修復建議
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ImportError::MissingResource { .. } | ImportError::InvalidResourceType { .. } => {
                "Give each import source a string `resource` option"
            }
            ImportError::MissingDependency { .. } => {
                "Rebuild with `--features s3` and configure AWS credentials"
            }
            ImportError::NotFound { .. } => {
                "Check the adapter keyword; built-in adapters are `file` and `s3`"
            }
            ImportError::DataLoadExhausted => {
                "Check that at least one import source points at existing data"
            }
            ImportError::InvalidOption { .. } => "Fix the option type in the import configuration",
            ImportError::ConfigError { .. }
            | ImportError::ConfigValidationError { .. }
            | ImportError::InvalidConfigValueError { .. } => {
                "Fix the project configuration file and run again"
            }
            ImportError::IoError(_) | ImportError::CsvError(_) => {
                "Check the file path and its delimited-text format"
            }
            _ => "Run with --verbose for details",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ImportError::DataLoadExhausted => {
                "None of the configured data sources produced a dataset".to_string()
            }
            ImportError::NotFound { keyword } => {
                format!("Unknown data source adapter '{}'", keyword)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message() {
        assert_eq!(
            ImportError::DataLoadExhausted.to_string(),
            "Failed to load data from all data sources"
        );
    }
}
