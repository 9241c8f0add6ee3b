//! 请求字段校验
//!
//! 统一的文本、月份、年份和部门校验，失败时返回 `PortalError::Validation`。

use crate::errors::{PortalError, Result};
use crate::storage::ReportSection;

pub const MIN_REPORT_YEAR: i32 = 2000;
pub const MAX_REPORT_YEAR: i32 = 2100;

/// 必填文本：去除首尾空白后不能为空
pub fn require_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PortalError::validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// 可选文本：空白视为未提供
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn validate_month(month: i32) -> Result<i32> {
    if (1..=12).contains(&month) {
        Ok(month)
    } else {
        Err(PortalError::validation(format!(
            "reportMonth must be between 1 and 12, got {}",
            month
        )))
    }
}

pub fn validate_year(year: i32) -> Result<i32> {
    if (MIN_REPORT_YEAR..=MAX_REPORT_YEAR).contains(&year) {
        Ok(year)
    } else {
        Err(PortalError::validation(format!(
            "reportYear must be between {} and {}, got {}",
            MIN_REPORT_YEAR, MAX_REPORT_YEAR, year
        )))
    }
}

/// 部门键：大小写不敏感，返回规范化后的枚举
pub fn validate_section(key: &str) -> Result<ReportSection> {
    ReportSection::from_key(key).ok_or_else(|| {
        PortalError::validation(format!(
            "Unknown section '{}'. Valid: {}",
            key.trim(),
            ReportSection::all_keys().join(", ")
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("name", "  Nairobi ").unwrap(), "Nairobi");
        let err = require_text("name", "   ").unwrap_err();
        assert_eq!(err.message(), "name is required");
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn test_month_and_year_bounds() {
        assert!(validate_month(1).is_ok());
        assert!(validate_month(12).is_ok());
        assert!(validate_month(0).is_err());
        assert!(validate_month(13).is_err());

        assert!(validate_year(2000).is_ok());
        assert!(validate_year(2100).is_ok());
        assert!(validate_year(1999).is_err());
        assert!(validate_year(2101).is_err());
    }

    #[test]
    fn test_validate_section() {
        assert_eq!(validate_section("Maal").unwrap(), ReportSection::Maal);
        let err = validate_section("finance").unwrap_err();
        assert!(err.message().contains("tabligh"));
    }
}
