use crate::domain::model::{Column, ColumnType, Dataset};
use crate::domain::ports::Summarizer;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSummary {
    pub name: String,
    pub kind: ColumnType,
    pub count: usize,
    pub missing: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// 邏輯欄位為 TRUE 的比例
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct: Option<usize>,
    /// 類別欄位各層級的次數
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<BTreeMap<String, usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub n_rows: usize,
    pub n_cols: usize,
    pub variables: Vec<VariableSummary>,
}

/// 逐欄位的摘要統計
#[derive(Debug, Clone, Default)]
pub struct VariableSummarizer;

impl VariableSummarizer {
    pub fn summarize_dataset(&self, dataset: &Dataset) -> DatasetSummary {
        DatasetSummary {
            n_rows: dataset.n_rows(),
            n_cols: dataset.n_cols(),
            variables: dataset.columns.iter().map(summarize_column).collect(),
        }
    }
}

impl Summarizer for VariableSummarizer {
    fn summarize(&self, dataset: &Dataset) -> Result<Value> {
        Ok(serde_json::to_value(self.summarize_dataset(dataset))?)
    }
}

fn summarize_column(column: &Column) -> VariableSummary {
    let missing = column.missing_count();
    let mut summary = VariableSummary {
        name: column.name.clone(),
        kind: column.kind,
        count: column.values.len(),
        missing,
        min: None,
        max: None,
        mean: None,
        distinct: None,
        levels: None,
    };

    match column.kind {
        ColumnType::Integer | ColumnType::Numeric => {
            let numbers: Vec<f64> = column.values.iter().filter_map(Value::as_f64).collect();
            if !numbers.is_empty() {
                summary.min = numbers.iter().copied().reduce(f64::min);
                summary.max = numbers.iter().copied().reduce(f64::max);
                summary.mean = Some(numbers.iter().sum::<f64>() / numbers.len() as f64);
            }
        }
        ColumnType::Logical => {
            let flags: Vec<bool> = column.values.iter().filter_map(Value::as_bool).collect();
            if !flags.is_empty() {
                let hits = flags.iter().filter(|b| **b).count();
                summary.mean = Some(hits as f64 / flags.len() as f64);
            }
        }
        ColumnType::Character | ColumnType::Factor => {
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for value in column.values.iter().filter_map(Value::as_str) {
                *counts.entry(value.to_string()).or_insert(0) += 1;
            }
            summary.distinct = Some(counts.len());
            if column.kind == ColumnType::Factor {
                summary.levels = Some(counts);
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![
            Column::new("age", ColumnType::Integer, vec![json!(20), json!(40), Value::Null]),
            Column::new("churned", ColumnType::Logical, vec![json!(true), json!(false), json!(true)]),
            Column::new("plan", ColumnType::Factor, vec![json!("basic"), json!("pro"), json!("basic")]),
            Column::new("note", ColumnType::Character, vec![json!("a"), json!("b"), Value::Null]),
        ])
        .unwrap()
    }

    #[test]
    fn test_numeric_summary() {
        let summary = VariableSummarizer.summarize_dataset(&dataset());
        let age = &summary.variables[0];

        assert_eq!(summary.n_rows, 3);
        assert_eq!(summary.n_cols, 4);
        assert_eq!(age.missing, 1);
        assert_eq!(age.min, Some(20.0));
        assert_eq!(age.max, Some(40.0));
        assert_eq!(age.mean, Some(30.0));
    }

    #[test]
    fn test_logical_and_factor_summary() {
        let summary = VariableSummarizer.summarize_dataset(&dataset());

        let churned = &summary.variables[1];
        assert!((churned.mean.unwrap() - 2.0 / 3.0).abs() < 1e-9);

        let plan = &summary.variables[2];
        assert_eq!(plan.distinct, Some(2));
        assert_eq!(plan.levels.as_ref().unwrap().get("basic"), Some(&2));

        let note = &summary.variables[3];
        assert_eq!(note.distinct, Some(2));
        assert!(note.levels.is_none());
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let value = VariableSummarizer.summarize(&dataset()).unwrap();
        assert_eq!(value["n_rows"], json!(3));
        assert_eq!(value["variables"][0]["kind"], json!("integer"));
    }
}
