use crate::domain::model::Dataset;
use crate::utils::error::{ImportError, Result};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// 單次執行中所有步驟共享的上下文
///
/// 由外層流程擁有；步驟只讀取或有條件地寫入。
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub execution_id: String,
    pub started_at: DateTime<Utc>,
    dataset: Option<Dataset>,
    namespaces: HashMap<String, Map<String, Value>>,
}

impl ExecutionContext {
    pub fn new(execution_id: String) -> Self {
        Self {
            execution_id,
            started_at: Utc::now(),
            dataset: None,
            namespaces: HashMap::new(),
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn has_dataset(&self) -> bool {
        self.dataset.is_some()
    }

    /// 填入資料集；每次執行只允許從空變為有值一次
    pub fn load_dataset(&mut self, dataset: Dataset) -> Result<()> {
        if self.dataset.is_some() {
            return Err(ImportError::DatasetAlreadyLoaded);
        }
        self.dataset = Some(dataset);
        Ok(())
    }

    pub fn take_dataset(&mut self) -> Option<Dataset> {
        self.dataset.take()
    }

    /// 取得階段自己的命名空間
    pub fn namespace(&self, stage: &str) -> Option<&Map<String, Value>> {
        self.namespaces.get(stage)
    }

    pub fn namespace_mut(&mut self, stage: &str) -> &mut Map<String, Value> {
        self.namespaces.entry(stage.to_string()).or_default()
    }

    pub fn get_artifact(&self, stage: &str, key: &str) -> Option<&Value> {
        self.namespace(stage).and_then(|ns| ns.get(key))
    }

    pub fn set_artifact(&mut self, stage: &str, key: &str, value: Value) {
        self.namespace_mut(stage).insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_new() {
        let context = ExecutionContext::new("run-1".to_string());
        assert_eq!(context.execution_id, "run-1");
        assert!(!context.has_dataset());
        assert!(context.namespace("import_stage").is_none());
    }

    #[test]
    fn test_dataset_loaded_once() {
        let mut context = ExecutionContext::new("run".to_string());
        context.load_dataset(Dataset::default()).unwrap();

        assert!(matches!(
            context.load_dataset(Dataset::default()),
            Err(ImportError::DatasetAlreadyLoaded)
        ));
        assert!(context.take_dataset().is_some());
        assert!(!context.has_dataset());
    }

    #[test]
    fn test_artifacts_are_namespaced() {
        let mut context = ExecutionContext::new("run".to_string());
        context.set_artifact("import_stage", "rows", json!(3));
        context.set_artifact("model_stage", "rows", json!(5));

        assert_eq!(context.get_artifact("import_stage", "rows"), Some(&json!(3)));
        assert_eq!(context.get_artifact("model_stage", "rows"), Some(&json!(5)));
        assert!(context.get_artifact("import_stage", "missing").is_none());
    }
}
