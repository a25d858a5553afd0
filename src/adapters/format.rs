use crate::domain::model::{value_type_name, Options, RESOURCE_KEY};
use crate::utils::error::{ImportError, Result};
use serde_json::Value;

/// 可代替 `resource` 的別名，依序搜尋
pub const RESOURCE_ALIASES: [&str; 4] = ["file", "filename", "name", "path"];

/// 不做任何轉換的格式化函式
pub fn identity_options(options: Options, _keyword: &str) -> Result<Options> {
    Ok(options)
}

/// 具名資源後端（檔案、物件儲存）共用的選項格式化
pub fn format_resource_options(mut options: Options, keyword: &str) -> Result<Options> {
    if is_empty_value(options.get(RESOURCE_KEY)) {
        let alias = RESOURCE_ALIASES
            .iter()
            .find_map(|alias| options.get(*alias).filter(|v| !is_empty_value(Some(*v))))
            .cloned();

        match alias {
            Some(value) => {
                options.insert(RESOURCE_KEY.to_string(), value);
            }
            None => {
                return Err(ImportError::MissingResource {
                    keyword: keyword.to_string(),
                })
            }
        }
    }

    match options.get(RESOURCE_KEY) {
        Some(Value::String(_)) => Ok(options),
        Some(other) => Err(ImportError::InvalidResourceType {
            actual: value_type_name(other).to_string(),
            keyword: keyword.to_string(),
        }),
        None => Err(ImportError::MissingResource {
            keyword: keyword.to_string(),
        }),
    }
}

fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}
