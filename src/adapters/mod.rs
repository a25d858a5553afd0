// Adapters layer: the uniform read/write contract and the concrete transports behind it.

pub mod file;
pub mod format;
pub mod registry;
pub mod s3;

use crate::domain::model::{merge_defaults, options_from_value, Dataset, Options};
use crate::domain::ports::{Backend, OptionFormatter};
use crate::utils::error::Result;
use serde_json::Value;
use std::fmt;

pub use file::{file_adapter, FileBackend, FILE_KEYWORD};
pub use format::{format_resource_options, identity_options, RESOURCE_ALIASES};
pub use registry::InMemoryRegistry;
pub use s3::{default_object_client, s3_adapter, ObjectPath, S3Backend, S3_KEYWORD};

/// 統一的資料讀寫轉接器
///
/// 建構後不可變。後端只會收到「合併預設值 → 格式化」之後的選項，
/// 呼叫端無法繞過這個組合。
pub struct Adapter {
    keyword: String,
    default_options: Options,
    formatter: Box<dyn OptionFormatter>,
    backend: Box<dyn Backend>,
}

impl Adapter {
    pub fn new<B: Backend + 'static>(backend: B) -> Self {
        Self {
            keyword: String::new(),
            default_options: Options::new(),
            formatter: Box::new(identity_options),
            backend: Box::new(backend),
        }
    }

    pub fn with_formatter<F: OptionFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn with_default_options(mut self, default_options: Options) -> Self {
        self.default_options = default_options;
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn default_options(&self) -> &Options {
        &self.default_options
    }

    /// 合併預設值並格式化選項；純量輸入視為 `resource`
    pub fn prepare_options(&self, options: Value) -> Result<Options> {
        let merged = merge_defaults(options_from_value(options), &self.default_options);
        self.formatter.format(merged, &self.keyword)
    }

    pub async fn read<O>(&self, options: O) -> Result<Dataset>
    where
        O: Into<Value> + Send,
    {
        let options = self.prepare_options(options.into())?;
        tracing::debug!("📥 [{}] read with options: {:?}", self.keyword, options);
        self.backend.read(&options).await
    }

    pub async fn write<O>(&self, dataset: &Dataset, options: O) -> Result<()>
    where
        O: Into<Value> + Send,
    {
        let options = self.prepare_options(options.into())?;
        tracing::debug!("💾 [{}] write with options: {:?}", self.keyword, options);
        self.backend.write(dataset, &options).await
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter")
            .field("keyword", &self.keyword)
            .field("default_options", &self.default_options)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adapter[{}]", self.keyword)
    }
}
