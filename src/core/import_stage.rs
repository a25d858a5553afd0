use crate::adapters::Adapter;
use crate::core::context::ExecutionContext;
use crate::core::engine::{LabeledStep, Step};
use crate::core::import_config::ImportConfig;
use crate::core::summary::VariableSummarizer;
use crate::domain::model::Options;
use crate::domain::ports::{AdapterRegistry, DefaultAdapterSource, Summarizer};
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// 匯入階段在上下文中的命名空間
pub const IMPORT_STAGE: &str = "import_stage";
pub const SUMMARY_KEY: &str = "variable_summaries";
pub const VERIFY_LABEL: &str = "(Internal) Verify data";

/// 嘗試從單一來源讀取資料
#[derive(Debug, Clone)]
pub struct SourceStep {
    adapter: Arc<Adapter>,
    options: Options,
}

impl SourceStep {
    pub fn new(adapter: Arc<Adapter>, options: Options) -> Self {
        Self { adapter, options }
    }

    pub fn label(&self) -> String {
        format!("Import from {}", self.adapter.keyword())
    }
}

#[async_trait]
impl Step for SourceStep {
    async fn run(&self, context: &mut ExecutionContext) -> Result<()> {
        if context.has_dataset() {
            tracing::debug!("⏭️ Dataset already loaded, skipping {}", self.adapter);
            return Ok(());
        }

        match self.adapter.read(Value::Object(self.options.clone())).await {
            Ok(dataset) => {
                tracing::info!(
                    "📥 Loaded {} rows x {} columns from {}",
                    dataset.n_rows(),
                    dataset.n_cols(),
                    self.adapter
                );
                context.load_dataset(dataset)
            }
            // 單一來源失敗不致命，交給下一個來源
            Err(e) => {
                tracing::warn!("⚠️ {} could not load data: {}", self.adapter, e);
                Ok(())
            }
        }
    }
}

/// 最後一步：確認已載入資料並附上摘要統計
#[derive(Clone)]
pub struct VerifyStep {
    summarizer: Arc<dyn Summarizer>,
}

impl VerifyStep {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }
}

#[async_trait]
impl Step for VerifyStep {
    async fn run(&self, context: &mut ExecutionContext) -> Result<()> {
        let summary = match context.dataset() {
            Some(dataset) => self.summarizer.summarize(dataset)?,
            None => return Err(ImportError::DataLoadExhausted),
        };
        context.set_artifact(IMPORT_STAGE, SUMMARY_KEY, summary);
        Ok(())
    }
}

/// 將匯入設定轉成「依序嘗試、成功即停、全部失敗則中止」的步驟鏈
pub struct ImportStageBuilder {
    registry: Arc<dyn AdapterRegistry>,
    default_keyword: String,
    summarizer: Arc<dyn Summarizer>,
}

impl ImportStageBuilder {
    pub fn new<D>(registry: Arc<dyn AdapterRegistry>, defaults: &D) -> Self
    where
        D: DefaultAdapterSource + ?Sized,
    {
        Self {
            registry,
            default_keyword: defaults.default_adapter_keyword(),
            summarizer: Arc::new(VariableSummarizer),
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn default_keyword(&self) -> &str {
        &self.default_keyword
    }

    /// 每個來源一個步驟，最後加上驗證步驟
    ///
    /// 未註冊的關鍵字在建構時即回報錯誤。
    pub fn build(&self, config: ImportConfig) -> Result<Vec<LabeledStep>> {
        let entries = config.into_entries(&self.default_keyword);
        let mut steps = Vec::with_capacity(entries.len() + 1);

        for (keyword, options) in entries {
            let adapter = self.registry.resolve(&keyword)?;
            let step = SourceStep::new(adapter, options);
            tracing::debug!("Built step: {}", step.label());
            steps.push(LabeledStep::new(step.label(), step));
        }

        steps.push(LabeledStep::new(
            VERIFY_LABEL,
            VerifyStep::new(self.summarizer.clone()),
        ));
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryRegistry;
    use crate::core::import_config::ImportSourceConfig;
    use crate::domain::model::{Column, ColumnType, Dataset};
    use crate::domain::ports::Backend;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedBackend {
        result: Option<Dataset>,
        reads: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Backend for FixedBackend {
        async fn read(&self, _options: &Options) -> Result<Dataset> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.result.clone().ok_or_else(|| ImportError::ProcessingError {
                message: "source unavailable".to_string(),
            })
        }

        async fn write(&self, _dataset: &Dataset, _options: &Options) -> Result<()> {
            Ok(())
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![Column::new("x", ColumnType::Integer, vec![json!(1)])]).unwrap()
    }

    fn adapter(keyword: &str, result: Option<Dataset>, reads: &Arc<AtomicUsize>) -> Adapter {
        Adapter::new(FixedBackend {
            result,
            reads: reads.clone(),
        })
        .with_keyword(keyword)
    }

    #[test]
    fn test_labels_follow_config_order() {
        let reads = Arc::new(AtomicUsize::new(0));
        let registry = InMemoryRegistry::new()
            .with_adapter(adapter("file", None, &reads))
            .with_adapter(adapter("s3", None, &reads));
        let builder = ImportStageBuilder::new(Arc::new(registry), "file");

        let steps = builder
            .build(ImportConfig::sources(vec![
                ImportSourceConfig::new("s3", "b"),
                ImportSourceConfig::unnamed("a.csv"),
            ]))
            .unwrap();

        let labels: Vec<&str> = steps.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Import from s3", "Import from file", VERIFY_LABEL]);
    }

    #[test]
    fn test_unknown_adapter_fails_at_build_time() {
        let builder = ImportStageBuilder::new(Arc::new(InMemoryRegistry::new()), "file");
        let result = builder.build(ImportConfig::single("a.csv"));
        assert!(matches!(result, Err(ImportError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_source_step_is_noop_once_loaded() {
        let reads = Arc::new(AtomicUsize::new(0));
        let step = SourceStep::new(Arc::new(adapter("file", Some(dataset()), &reads)), Options::new());
        let mut context = ExecutionContext::new("test".to_string());
        context.load_dataset(Dataset::default()).unwrap();

        step.run(&mut context).await.unwrap();

        assert_eq!(reads.load(Ordering::SeqCst), 0);
        assert_eq!(context.dataset(), Some(&Dataset::default()));
    }

    #[tokio::test]
    async fn test_source_step_swallows_read_failure() {
        let reads = Arc::new(AtomicUsize::new(0));
        let step = SourceStep::new(Arc::new(adapter("file", None, &reads)), Options::new());
        let mut context = ExecutionContext::new("test".to_string());

        step.run(&mut context).await.unwrap();

        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert!(!context.has_dataset());
    }

    #[tokio::test]
    async fn test_verify_step_stores_summary() {
        let mut context = ExecutionContext::new("test".to_string());
        context.load_dataset(dataset()).unwrap();

        VerifyStep::new(Arc::new(VariableSummarizer))
            .run(&mut context)
            .await
            .unwrap();

        let summary = context.get_artifact(IMPORT_STAGE, SUMMARY_KEY).unwrap();
        assert_eq!(summary["n_rows"], json!(1));
    }
}
