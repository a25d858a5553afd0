use crate::core::ImportConfig;
use crate::domain::ports::DefaultAdapterSource;
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 專案未設定時使用的轉接器
pub const DEFAULT_ADAPTER_KEYWORD: &str = "file";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub project: ProjectInfo,
    pub s3: Option<S3Config>,
    pub import: Option<ImportConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub name: Option<String>,
    pub default_adapter: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// 預設物件路徑，例如 `s3://bucket/prefix/`
    pub path: Option<String>,
    pub region: Option<String>,
}

impl ProjectConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ImportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ImportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ImportError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn s3_path(&self) -> Option<String> {
        self.s3.as_ref().and_then(|s| s.path.clone())
    }

    pub fn s3_region(&self) -> Option<String> {
        self.s3.as_ref().and_then(|s| s.region.clone())
    }

    /// 取得匯入設定；未設定時回報錯誤
    pub fn import_config(&self) -> Result<ImportConfig> {
        self.import.clone().ok_or_else(|| ImportError::ConfigError {
            message: "No [import] section in project configuration".to_string(),
        })
    }
}

impl DefaultAdapterSource for ProjectConfig {
    fn default_adapter_keyword(&self) -> String {
        self.project
            .default_adapter
            .clone()
            .unwrap_or_else(|| DEFAULT_ADAPTER_KEYWORD.to_string())
    }
}

impl Validate for ProjectConfig {
    fn validate(&self) -> Result<()> {
        if let Some(keyword) = &self.project.default_adapter {
            validation::validate_keyword("project.default_adapter", keyword)?;
        }

        if let Some(path) = self.s3_path() {
            validation::validate_object_path("s3.path", &path)?;
        }

        if let Some(region) = self.s3_region() {
            validation::validate_non_empty_string("s3.region", &region)?;
        }

        if let Some(ImportConfig::MultiSource { sources }) = &self.import {
            if sources.is_empty() {
                return Err(ImportError::ConfigValidationError {
                    field: "import.sources".to_string(),
                    message: "At least one import source is required".to_string(),
                });
            }
            for (i, source) in sources.iter().enumerate() {
                if let Some(keyword) = &source.adapter {
                    validation::validate_keyword(&format!("import.sources[{}].adapter", i), keyword)?;
                }
            }
        }

        Ok(())
    }
}
