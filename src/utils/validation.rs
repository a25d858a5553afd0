use crate::utils::error::{ImportError, Result};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_object_path(field_name: &str, uri: &str) -> Result<()> {
    validate_non_empty_string(field_name, uri)?;

    match Url::parse(uri) {
        Ok(url) => match url.scheme() {
            "s3" if url.host_str().map_or(false, |h| !h.is_empty()) => Ok(()),
            "s3" => Err(ImportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: uri.to_string(),
                reason: "Object path has no bucket".to_string(),
            }),
            scheme => Err(ImportError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: uri.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: uri.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

/// 設定檔、匯出檔與摘要檔路徑：必須指向檔案而非目錄
pub fn validate_file_path(field_name: &str, path: &str) -> Result<()> {
    let reason = if path.trim().is_empty() {
        Some("Path cannot be empty")
    } else if path.contains('\0') {
        Some("Path contains null bytes")
    } else if path.ends_with(['/', '\\']) || Path::new(path).file_name().is_none() {
        Some("Path must name a file, not a directory")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 轉接器關鍵字只允許小寫英數字、`-` 與 `_`
pub fn validate_keyword(field_name: &str, keyword: &str) -> Result<()> {
    validate_non_empty_string(field_name, keyword)?;

    if !keyword
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(ImportError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: keyword.to_string(),
            reason: "Adapter keywords can only contain lowercase letters, numbers, '-' and '_'"
                .to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_object_path() {
        assert!(validate_object_path("s3.path", "s3://bucket/prefix/").is_ok());
        assert!(validate_object_path("s3.path", "s3://bucket").is_ok());
        assert!(validate_object_path("s3.path", "").is_err());
        assert!(validate_object_path("s3.path", "bucket/prefix").is_err());
        assert!(validate_object_path("s3.path", "https://bucket/prefix").is_err());
    }

    #[test]
    fn test_validate_file_path() {
        assert!(validate_file_path("export", "out/data.csv").is_ok());
        assert!(validate_file_path("export", "").is_err());
        assert!(validate_file_path("export", "bad\0path").is_err());
        assert!(validate_file_path("export", "out/").is_err());
        assert!(validate_file_path("export", "..").is_err());
    }

    #[test]
    fn test_validate_keyword() {
        assert!(validate_keyword("project.default_adapter", "file").is_ok());
        assert!(validate_keyword("project.default_adapter", "s3").is_ok());
        assert!(validate_keyword("project.default_adapter", "File").is_err());
        assert!(validate_keyword("project.default_adapter", " ").is_err());
    }
}
