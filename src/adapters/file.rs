use crate::adapters::format::{format_resource_options, RESOURCE_ALIASES};
use crate::adapters::Adapter;
use crate::domain::model::{value_type_name, Column, ColumnType, Dataset, Options, RESOURCE_KEY};
use crate::domain::ports::Backend;
use crate::utils::error::{ImportError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const FILE_KEYWORD: &str = "file";

/// 讀取時的缺值記號
const NA_TOKEN: &str = "NA";
const LOGICAL_TRUE: [&str; 4] = ["TRUE", "T", "true", "True"];
const LOGICAL_FALSE: [&str; 4] = ["FALSE", "F", "false", "False"];

/// 寫入端支援的選項
const WRITE_OPTIONS: [&str; 5] = ["sep", "quote", "na", "col_names", "dec"];

/// 本機分隔文字檔後端
#[derive(Debug, Clone, Default)]
pub struct FileBackend;

pub fn file_adapter() -> Adapter {
    Adapter::new(FileBackend)
        .with_keyword(FILE_KEYWORD)
        .with_formatter(format_resource_options)
}

/// 讀取端可調整的選項（只在呼叫端有給時才生效）
#[derive(Debug, Clone)]
struct ReadSettings {
    header: bool,
    sep: u8,
    quote: Option<u8>,
    dec: u8,
    fill: bool,
    comment_char: Option<u8>,
    strings_as_factors: bool,
}

impl ReadSettings {
    fn from_options(options: &Options) -> Result<Self> {
        Ok(Self {
            header: option_bool(options, "header")?.unwrap_or(true),
            sep: option_byte(options, "sep")?.flatten().unwrap_or(b','),
            quote: option_byte(options, "quote")?.unwrap_or(Some(b'"')),
            dec: option_byte(options, "dec")?.flatten().unwrap_or(b'.'),
            fill: option_bool(options, "fill")?.unwrap_or(true),
            comment_char: option_byte(options, "comment_char")?.flatten(),
            // 字串預設不轉為類別
            strings_as_factors: option_bool(options, "strings_as_factors")?.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone)]
struct WriteSettings {
    sep: u8,
    quote: bool,
    na: String,
    col_names: bool,
    dec: u8,
}

impl WriteSettings {
    fn from_options(options: &Options) -> Result<Self> {
        for key in unsupported_write_options(options) {
            tracing::warn!("⚠️ Writer option '{}' is not supported and was ignored", key);
        }

        Ok(Self {
            sep: option_byte(options, "sep")?.flatten().unwrap_or(b','),
            quote: option_bool(options, "quote")?.unwrap_or(true),
            na: option_string(options, "na")?.unwrap_or_else(|| NA_TOKEN.to_string()),
            col_names: option_bool(options, "col_names")?.unwrap_or(true),
            dec: option_byte(options, "dec")?.flatten().unwrap_or(b'.'),
        })
    }
}

#[async_trait]
impl Backend for FileBackend {
    async fn read(&self, options: &Options) -> Result<Dataset> {
        let path = resource_path(options)?;
        let settings = ReadSettings::from_options(options)?;
        tracing::debug!("Reading delimited file: {}", path);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(settings.sep)
            .quoting(settings.quote.is_some())
            .quote(settings.quote.unwrap_or(b'"'))
            .comment(settings.comment_char)
            .flexible(settings.fill)
            .from_path(path)?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        if rows.is_empty() {
            return Err(ImportError::ProcessingError {
                message: format!("no lines available in input: {}", path),
            });
        }

        let names = if settings.header {
            rows.remove(0)
        } else {
            let width = rows.iter().map(Vec::len).max().unwrap_or(0);
            (1..=width).map(|i| format!("V{}", i)).collect()
        };

        let width = names.len();
        let mut raw_columns: Vec<Vec<Option<String>>> = vec![Vec::with_capacity(rows.len()); width];
        for row in rows {
            let mut cells = row.into_iter();
            for column in raw_columns.iter_mut() {
                column.push(cells.next());
            }
            if cells.next().is_some() {
                tracing::warn!("Row in {} has more than {} fields, extra fields dropped", path, width);
            }
        }

        let columns = names
            .into_iter()
            .zip(raw_columns)
            .map(|(name, cells)| infer_column(name, cells, &settings))
            .collect();

        Dataset::from_columns(columns)
    }

    async fn write(&self, dataset: &Dataset, options: &Options) -> Result<()> {
        let path = resource_path(options)?;
        let settings = WriteSettings::from_options(options)?;

        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .delimiter(settings.sep)
            .quote_style(if settings.quote {
                csv::QuoteStyle::NonNumeric
            } else {
                csv::QuoteStyle::Never
            })
            .from_path(path)?;

        if settings.col_names {
            writer.write_record(dataset.columns.iter().map(|c| c.name.as_str()))?;
        }

        // 不寫入列標籤
        for row in 0..dataset.n_rows() {
            let record: Vec<String> = dataset
                .columns
                .iter()
                .map(|column| {
                    let value = column.values.get(row).unwrap_or(&Value::Null);
                    render_cell(value, &settings)
                })
                .collect();
            writer.write_record(&record)?;
        }

        writer.flush()?;
        tracing::debug!("Wrote {} rows to {}", dataset.n_rows(), path);
        Ok(())
    }
}

/// 寫入時會被忽略的呼叫端選項
fn unsupported_write_options(options: &Options) -> Vec<&str> {
    options
        .keys()
        .map(String::as_str)
        .filter(|key| {
            *key != RESOURCE_KEY && !RESOURCE_ALIASES.contains(key) && !WRITE_OPTIONS.contains(key)
        })
        .collect()
}

fn resource_path(options: &Options) -> Result<&str> {
    options
        .get(RESOURCE_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| ImportError::MissingResource {
            keyword: FILE_KEYWORD.to_string(),
        })
}

fn infer_column(name: String, cells: Vec<Option<String>>, settings: &ReadSettings) -> Column {
    let present: Vec<&str> = cells
        .iter()
        .filter_map(|c| c.as_deref())
        .filter(|s| !is_missing_token(s))
        .collect();

    let kind = if present.iter().all(|s| parse_logical(s).is_some()) {
        ColumnType::Logical
    } else if present.iter().all(|s| s.trim().parse::<i64>().is_ok()) {
        ColumnType::Integer
    } else if present.iter().all(|s| parse_numeric(s, settings.dec).is_some()) {
        ColumnType::Numeric
    } else if settings.strings_as_factors {
        ColumnType::Factor
    } else {
        ColumnType::Character
    };

    let values = cells
        .into_iter()
        .map(|cell| match (kind, cell) {
            (_, None) => Value::Null,
            (ColumnType::Character | ColumnType::Factor, Some(s)) if s == NA_TOKEN => Value::Null,
            (ColumnType::Character | ColumnType::Factor, Some(s)) => Value::String(s),
            (_, Some(s)) if is_missing_token(&s) => Value::Null,
            (ColumnType::Logical, Some(s)) => parse_logical(&s).map(Value::Bool).unwrap_or(Value::Null),
            (ColumnType::Integer, Some(s)) => s
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or(Value::Null),
            (ColumnType::Numeric, Some(s)) => parse_numeric(&s, settings.dec)
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
        })
        .collect();

    Column::new(name, kind, values)
}

fn is_missing_token(s: &str) -> bool {
    s == NA_TOKEN || s.trim().is_empty()
}

fn parse_logical(s: &str) -> Option<bool> {
    let s = s.trim();
    if LOGICAL_TRUE.contains(&s) {
        Some(true)
    } else if LOGICAL_FALSE.contains(&s) {
        Some(false)
    } else {
        None
    }
}

fn parse_numeric(s: &str, dec: u8) -> Option<f64> {
    let s = s.trim();
    let parsed = if dec == b'.' {
        s.parse::<f64>().ok()
    } else {
        s.replace(dec as char, ".").parse::<f64>().ok()
    };
    parsed.filter(|v| v.is_finite())
}

fn render_cell(value: &Value, settings: &WriteSettings) -> String {
    match value {
        Value::Null => settings.na.clone(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) if settings.dec != b'.' => n.to_string().replace('.', &(settings.dec as char).to_string()),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn option_bool(options: &Options, key: &str) -> Result<Option<bool>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(ImportError::InvalidOption {
            option: key.to_string(),
            reason: format!("expected a boolean, got {}", value_type_name(other)),
        }),
    }
}

fn option_string(options: &Options, key: &str) -> Result<Option<String>> {
    match options.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ImportError::InvalidOption {
            option: key.to_string(),
            reason: format!("expected a string, got {}", value_type_name(other)),
        }),
    }
}

/// 單一位元組字元選項；`Some(None)` 表示呼叫端給了空字串（停用）
fn option_byte(options: &Options, key: &str) -> Result<Option<Option<u8>>> {
    match option_string(options, key)? {
        None => Ok(None),
        Some(s) if s.is_empty() => Ok(Some(None)),
        Some(s) if s.len() == 1 => Ok(Some(Some(s.as_bytes()[0]))),
        Some(s) => Err(ImportError::InvalidOption {
            option: key.to_string(),
            reason: format!("expected a single-byte character, got '{}'", s),
        }),
    }
}
