use crate::adapters::Adapter;
use crate::domain::model::{Dataset, Options};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// 具體傳輸後端的讀寫操作
///
/// 只會經由 [`Adapter`] 呼叫，收到的選項都已合併預設值並格式化。
#[async_trait]
pub trait Backend: Send + Sync {
    async fn read(&self, options: &Options) -> Result<Dataset>;
    async fn write(&self, dataset: &Dataset, options: &Options) -> Result<()>;
}

/// 選項格式化函式，`keyword` 用於錯誤訊息
pub trait OptionFormatter: Send + Sync {
    fn format(&self, options: Options, keyword: &str) -> Result<Options>;
}

impl<F> OptionFormatter for F
where
    F: Fn(Options, &str) -> Result<Options> + Send + Sync,
{
    fn format(&self, options: Options, keyword: &str) -> Result<Options> {
        self(options, keyword)
    }
}

pub trait AdapterRegistry: Send + Sync {
    fn lookup(&self, keyword: &str) -> Option<Arc<Adapter>>;

    /// 查不到關鍵字視為設定錯誤，而不是「沒有資料」
    fn resolve(&self, keyword: &str) -> Result<Arc<Adapter>> {
        self.lookup(keyword).ok_or_else(|| ImportError::NotFound {
            keyword: keyword.to_string(),
        })
    }
}

pub trait DefaultAdapterSource {
    fn default_adapter_keyword(&self) -> String;
}

impl DefaultAdapterSource for str {
    fn default_adapter_keyword(&self) -> String {
        self.to_string()
    }
}

pub trait Summarizer: Send + Sync {
    fn summarize(&self, dataset: &Dataset) -> Result<serde_json::Value>;
}

/// 物件儲存客戶端
#[async_trait]
pub trait ObjectClient: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;
}
