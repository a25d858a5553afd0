use crate::domain::model::{options_from_value, Options};
use crate::utils::error::Result;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 列表形式的多來源設定鍵
const SOURCES_KEY: &str = "sources";

/// 一個匯入來源：轉接器關鍵字（可省略）與其選項
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSourceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,
    #[serde(flatten)]
    pub options: Options,
}

impl ImportSourceConfig {
    pub fn new(adapter: impl Into<String>, options: impl Into<Value>) -> Self {
        Self {
            adapter: Some(adapter.into()),
            options: options_from_value(options.into()),
        }
    }

    /// 未指定轉接器，建構匯入階段時使用專案預設
    pub fn unnamed(options: impl Into<Value>) -> Self {
        Self {
            adapter: None,
            options: options_from_value(options.into()),
        }
    }
}

/// 匯入設定：單一來源或有序的多個來源
///
/// 反序列化時依形狀判斷（見 [`ImportConfig::from_value`]）。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImportConfig {
    MultiSource { sources: Vec<ImportSourceConfig> },
    SingleSource(Options),
}

impl<'de> Deserialize<'de> for ImportConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        ImportConfig::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl ImportConfig {
    /// 依輸入形狀決定來源清單
    ///
    /// - 含 `sources` 陣列：依序的來源清單，關鍵字可重複
    /// - 所有值都是表格：以轉接器關鍵字為鍵，依文件順序嘗試
    /// - 其他（選項表格或單一純量）：單一來源
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(mut map) if matches!(map.get(SOURCES_KEY), Some(Value::Array(_))) => {
                let sources = map.remove(SOURCES_KEY).unwrap_or(Value::Null);
                Ok(ImportConfig::MultiSource {
                    sources: serde_json::from_value(sources)?,
                })
            }
            Value::Object(map) if !map.is_empty() && map.values().all(Value::is_object) => {
                Ok(ImportConfig::sources(
                    map.into_iter()
                        .map(|(keyword, options)| ImportSourceConfig::new(keyword, options)),
                ))
            }
            other => Ok(ImportConfig::SingleSource(options_from_value(other))),
        }
    }

    pub fn single(options: impl Into<Value>) -> Self {
        ImportConfig::SingleSource(options_from_value(options.into()))
    }

    pub fn sources(sources: impl IntoIterator<Item = ImportSourceConfig>) -> Self {
        ImportConfig::MultiSource {
            sources: sources.into_iter().collect(),
        }
    }

    /// 展開成 (關鍵字, 選項) 清單，未命名者套用預設關鍵字
    pub fn into_entries(self, default_keyword: &str) -> Vec<(String, Options)> {
        match self {
            ImportConfig::SingleSource(options) => vec![(default_keyword.to_string(), options)],
            ImportConfig::MultiSource { sources } => sources
                .into_iter()
                .map(|source| {
                    let keyword = source
                        .adapter
                        .unwrap_or_else(|| default_keyword.to_string());
                    (keyword, source.options)
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ImportConfig::SingleSource(_) => 1,
            ImportConfig::MultiSource { sources } => sources.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
