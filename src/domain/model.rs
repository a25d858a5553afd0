use crate::utils::error::{ImportError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 轉接器選項集合
pub type Options = serde_json::Map<String, Value>;

/// 解析資源位置時使用的正式鍵名
pub const RESOURCE_KEY: &str = "resource";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Logical,
    Integer,
    Numeric,
    Character,
    /// 類別型欄位；只有在呼叫端明確要求時才會產生
    Factor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }
}

/// 以欄為單位的資料表
///
/// 反序列化也經過 [`Dataset::from_columns`]，外部來源的資料同樣保證欄長一致。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset")]
pub struct Dataset {
    pub columns: Vec<Column>,
}

#[derive(Deserialize)]
struct RawDataset {
    columns: Vec<Column>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = ImportError;

    fn try_from(raw: RawDataset) -> Result<Self> {
        Dataset::from_columns(raw.columns)
    }
}

impl Dataset {
    /// 建立資料表，所有欄位長度必須一致
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.values.len();
            if let Some(bad) = columns.iter().find(|c| c.values.len() != expected) {
                return Err(ImportError::ProcessingError {
                    message: format!(
                        "column '{}' has {} values, expected {}",
                        bad.name,
                        bad.values.len(),
                        expected
                    ),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// 將任意值轉為選項集合
///
/// 物件直接使用；`null` 視為空集合；其他純量視為 `resource`。
pub fn options_from_value(value: Value) -> Options {
    match value {
        Value::Object(map) => map,
        Value::Null => Options::new(),
        scalar => {
            let mut options = Options::new();
            options.insert(RESOURCE_KEY.to_string(), scalar);
            options
        }
    }
}

/// 以左側優先合併預設值：呼叫端已給的鍵永遠不被覆蓋
pub fn merge_defaults(mut options: Options, defaults: &Options) -> Options {
    for (key, value) in defaults {
        options
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }
    options
}

pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_becomes_resource() {
        let options = options_from_value(json!("data.csv"));
        assert_eq!(options.get("resource"), Some(&json!("data.csv")));

        assert!(options_from_value(Value::Null).is_empty());
    }

    #[test]
    fn test_merge_defaults_is_left_biased() {
        let options = options_from_value(json!({"sep": ";", "resource": "a.csv"}));
        let defaults = options_from_value(json!({"sep": ",", "header": true}));

        let merged = merge_defaults(options, &defaults);

        assert_eq!(merged.get("sep"), Some(&json!(";")));
        assert_eq!(merged.get("header"), Some(&json!(true)));
        assert_eq!(merged.get("resource"), Some(&json!("a.csv")));
    }

    #[test]
    fn test_dataset_rejects_ragged_columns() {
        let result = Dataset::from_columns(vec![
            Column::new("a", ColumnType::Integer, vec![json!(1), json!(2)]),
            Column::new("b", ColumnType::Integer, vec![json!(1)]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_checks_column_lengths() {
        let ragged = json!({"columns": [
            {"name": "a", "kind": "integer", "values": [1, 2]},
            {"name": "b", "kind": "integer", "values": [1]}
        ]});
        let err = serde_json::from_value::<Dataset>(ragged).unwrap_err();
        assert!(err.to_string().contains("column 'b' has 1 values, expected 2"));

        let even = json!({"columns": [{"name": "a", "kind": "logical", "values": [true, null]}]});
        let dataset: Dataset = serde_json::from_value(even).unwrap();
        assert_eq!(dataset.n_rows(), 2);
    }

    #[test]
    fn test_dataset_shape() {
        let dataset = Dataset::from_columns(vec![
            Column::new("id", ColumnType::Integer, vec![json!(1), json!(2)]),
            Column::new("name", ColumnType::Character, vec![json!("a"), Value::Null]),
        ])
        .unwrap();

        assert_eq!(dataset.n_rows(), 2);
        assert_eq!(dataset.n_cols(), 2);
        assert_eq!(dataset.column_names(), vec!["id", "name"]);
        assert_eq!(dataset.column("name").unwrap().missing_count(), 1);
    }
}
