use crate::adapters::{file_adapter, s3_adapter, Adapter};
use crate::domain::ports::{AdapterRegistry, ObjectClient};
use std::collections::HashMap;
use std::sync::Arc;

/// 以關鍵字索引的轉接器註冊表，由呼叫端明確填入
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistry {
    adapters: HashMap<String, Arc<Adapter>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 註冊內建的 `file` 與 `s3` 轉接器
    pub fn builtin(object_client: Option<Arc<dyn ObjectClient>>, s3_path: Option<String>) -> Self {
        Self::new()
            .with_adapter(file_adapter())
            .with_adapter(s3_adapter(object_client, s3_path))
    }

    /// 以轉接器自己的關鍵字註冊；同名者會被取代
    pub fn register(&mut self, adapter: Adapter) -> Option<Arc<Adapter>> {
        let keyword = adapter.keyword().to_string();
        tracing::debug!("Registering adapter '{}'", keyword);
        self.adapters.insert(keyword, Arc::new(adapter))
    }

    pub fn with_adapter(mut self, adapter: Adapter) -> Self {
        self.register(adapter);
        self
    }

    pub fn keywords(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        keywords.sort_unstable();
        keywords
    }
}

impl AdapterRegistry for InMemoryRegistry {
    fn lookup(&self, keyword: &str) -> Option<Arc<Adapter>> {
        self.adapters.get(keyword).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ImportError;

    #[test]
    fn test_builtin_registry() {
        let registry = InMemoryRegistry::builtin(None, None);
        assert_eq!(registry.keywords(), vec!["file", "s3"]);
        assert_eq!(registry.resolve("file").unwrap().keyword(), "file");
    }

    #[test]
    fn test_unknown_keyword_is_not_found() {
        let registry = InMemoryRegistry::builtin(None, None);
        match registry.resolve("ftp") {
            Err(ImportError::NotFound { keyword }) => assert_eq!(keyword, "ftp"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(registry.lookup("ftp").is_none());
    }
}
