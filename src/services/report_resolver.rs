//! Report read-time resolution
//!
//! A normalized row with every data column empty has not been migrated yet.
//! Its values may still live in the legacy JSON blob stored under the same
//! composite key, so each row is resolved exactly once into [`ResolvedReport`]
//! before export.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::Result;
use crate::storage::{ReportFields, ReportKey, ReportRow, SeaOrmStorage};

#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedReport {
    /// 至少一个数据列有值，旧数据被忽略
    Normalized(ReportRow),
    /// 数据列全空，已用旧版 JSON 填充
    Legacy(ReportRow),
    /// 数据列全空且没有可用的旧数据
    Unmigrated(ReportRow),
}

impl ResolvedReport {
    pub fn row(&self) -> &ReportRow {
        match self {
            Self::Normalized(row) | Self::Legacy(row) | Self::Unmigrated(row) => row,
        }
    }

    pub fn into_row(self) -> ReportRow {
        match self {
            Self::Normalized(row) | Self::Legacy(row) | Self::Unmigrated(row) => row,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Self::Normalized(_) => "normalized",
            Self::Legacy(_) => "legacy",
            Self::Unmigrated(_) => "unmigrated",
        }
    }
}

/// 根据旧数据查询结果解析一行
///
/// 仅在数据列全空时才会用到 `lookup`；查询失败按未命中处理。
pub fn resolve_with_lookup(row: ReportRow, lookup: Result<Option<String>>) -> ResolvedReport {
    if !row.fields.is_empty() {
        return ResolvedReport::Normalized(row);
    }

    let raw = match lookup {
        Ok(Some(raw)) => raw,
        Ok(None) => return ResolvedReport::Unmigrated(row),
        Err(e) => {
            warn!(
                "Legacy lookup failed for report {} ({}): {}",
                row.id,
                describe_key(&row.key),
                e
            );
            return ResolvedReport::Unmigrated(row);
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(details)) => {
            let fields = merge_legacy_fields(&row.fields, &details);
            if fields.is_empty() {
                debug!(
                    "Legacy details for {} carry no report fields",
                    describe_key(&row.key)
                );
                return ResolvedReport::Unmigrated(row);
            }
            ResolvedReport::Legacy(ReportRow { fields, ..row })
        }
        Ok(_) => {
            warn!(
                "Legacy details for {} are not a JSON object, skipped",
                describe_key(&row.key)
            );
            ResolvedReport::Unmigrated(row)
        }
        Err(e) => {
            warn!(
                "Legacy details for {} are not valid JSON: {}",
                describe_key(&row.key),
                e
            );
            ResolvedReport::Unmigrated(row)
        }
    }
}

/// 解析一行：数据列全空时按复合键查旧表
pub async fn resolve_report(storage: &SeaOrmStorage, row: ReportRow) -> ResolvedReport {
    if !row.fields.is_empty() {
        return ResolvedReport::Normalized(row);
    }
    let lookup = storage.find_legacy_details(&row.key).await;
    resolve_with_lookup(row, lookup)
}

pub async fn resolve_reports(storage: &SeaOrmStorage, rows: Vec<ReportRow>) -> Vec<ResolvedReport> {
    let mut resolved = Vec::with_capacity(rows.len());
    for row in rows {
        resolved.push(resolve_report(storage, row).await);
    }
    resolved
}

/// 旧数据覆盖到行上；不认识的键忽略，无法解析的值保留原值
pub fn merge_legacy_fields(base: &ReportFields, details: &Map<String, Value>) -> ReportFields {
    ReportFields {
        meetings_held: lookup(details, "meetings_held", "meetingsHeld")
            .and_then(as_i32)
            .or(base.meetings_held),
        attendance: lookup(details, "attendance", "attendance")
            .and_then(as_i32)
            .or(base.attendance),
        members_contacted: lookup(details, "members_contacted", "membersContacted")
            .and_then(as_i32)
            .or(base.members_contacted),
        books_distributed: lookup(details, "books_distributed", "booksDistributed")
            .and_then(as_i32)
            .or(base.books_distributed),
        amount_collected: lookup(details, "amount_collected", "amountCollected")
            .and_then(as_f64)
            .or(base.amount_collected),
        target_amount: lookup(details, "target_amount", "targetAmount")
            .and_then(as_f64)
            .or(base.target_amount),
        remarks: lookup(details, "remarks", "remarks")
            .and_then(as_text)
            .or_else(|| base.remarks.clone()),
    }
}

fn lookup<'a>(details: &'a Map<String, Value>, snake: &str, camel: &str) -> Option<&'a Value> {
    details
        .get(snake)
        .or_else(|| details.get(camel))
        .filter(|v| !v.is_null())
}

fn as_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn describe_key(key: &ReportKey) -> String {
    format!(
        "{}/{}/{}-{}/{}",
        key.region_id, key.majlis_id, key.report_year, key.report_month, key.section_key
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PortalError;
    use chrono::Utc;
    use serde_json::json;

    fn row(fields: ReportFields) -> ReportRow {
        ReportRow {
            id: 7,
            key: ReportKey {
                region_id: 1,
                majlis_id: 2,
                report_month: 3,
                report_year: 2024,
                section_key: "tabligh".to_string(),
            },
            fields,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_populated_row_ignores_blob() {
        let populated = row(ReportFields {
            meetings_held: Some(4),
            ..Default::default()
        });
        let blob = json!({"meetings_held": 99, "remarks": "old"}).to_string();

        let resolved = resolve_with_lookup(populated.clone(), Ok(Some(blob)));
        assert_eq!(resolved, ResolvedReport::Normalized(populated));
        assert_eq!(resolved.source(), "normalized");
    }

    #[test]
    fn test_empty_row_filled_from_blob() {
        let blob = json!({
            "meetingsHeld": "5",
            "attendance": 40,
            "amount_collected": "1250.50",
            "target_amount": 2000,
            "remarks": "carried over",
            "unrelated": true
        })
        .to_string();

        let resolved = resolve_with_lookup(row(ReportFields::default()), Ok(Some(blob)));
        assert_eq!(resolved.source(), "legacy");

        let fields = &resolved.row().fields;
        assert_eq!(fields.meetings_held, Some(5));
        assert_eq!(fields.attendance, Some(40));
        assert_eq!(fields.members_contacted, None);
        assert_eq!(fields.amount_collected, Some(1250.5));
        assert_eq!(fields.target_amount, Some(2000.0));
        assert_eq!(fields.remarks.as_deref(), Some("carried over"));
        assert_eq!(resolved.row().id, 7);
    }

    #[test]
    fn test_miss_and_error_emit_row_unchanged() {
        let empty = row(ReportFields::default());

        let missed = resolve_with_lookup(empty.clone(), Ok(None));
        assert_eq!(missed, ResolvedReport::Unmigrated(empty.clone()));

        let failed = resolve_with_lookup(
            empty.clone(),
            Err(PortalError::database_operation("connection reset")),
        );
        assert_eq!(failed, ResolvedReport::Unmigrated(empty.clone()));

        let garbage = resolve_with_lookup(empty.clone(), Ok(Some("not json".to_string())));
        assert_eq!(garbage.source(), "unmigrated");

        let array = resolve_with_lookup(empty, Ok(Some("[1,2]".to_string())));
        assert_eq!(array.source(), "unmigrated");
    }

    #[test]
    fn test_blob_without_known_fields_stays_unmigrated() {
        let empty = row(ReportFields::default());

        for blob in [json!({"foo": 1}), json!({}), json!({"meetings_held": "n/a"})] {
            let resolved = resolve_with_lookup(empty.clone(), Ok(Some(blob.to_string())));
            assert_eq!(resolved, ResolvedReport::Unmigrated(empty.clone()), "{}", blob);
        }
    }

    #[test]
    fn test_value_coercion() {
        assert_eq!(as_i32(&json!(3.0)), Some(3));
        assert_eq!(as_i32(&json!(3.5)), None);
        assert_eq!(as_i32(&json!(" 12 ")), Some(12));
        assert_eq!(as_i32(&json!("twelve")), None);
        assert_eq!(as_f64(&json!("NaN")), None);
        assert_eq!(as_text(&json!("  ")), None);
        assert_eq!(as_text(&json!(10)), Some("10".to_string()));
    }
}
