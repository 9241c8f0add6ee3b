//! Monthly section reports and CSV export

use std::collections::HashMap;
use std::sync::Arc;

use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::get_config;
use crate::errors::{PortalError, Result};
use crate::storage::{
    LegacyReport, ReportFields, ReportFilter, ReportKey, ReportRow, SeaOrmStorage,
};
use crate::utils::validators::{validate_month, validate_section, validate_year};

use super::report_resolver::{ResolvedReport, resolve_reports};

/// 导出查询；未给出部门时使用 `export.default_section`
#[derive(Debug, Clone, Default)]
pub struct ExportQuery {
    pub section: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub region_id: Option<i32>,
    pub majlis_id: Option<i32>,
}

/// 生成好的导出文件
#[derive(Debug, Clone)]
pub struct ReportExport {
    pub filename: String,
    pub content: Vec<u8>,
    pub rows: usize,
}

/// CSV 中的一行
#[derive(Debug, Serialize)]
struct CsvReportRow {
    source: &'static str,
    region: String,
    majlis: String,
    report_year: i32,
    report_month: i32,
    section: String,
    meetings_held: Option<i32>,
    attendance: Option<i32>,
    members_contacted: Option<i32>,
    books_distributed: Option<i32>,
    amount_collected: Option<f64>,
    target_amount: Option<f64>,
    remarks: Option<String>,
}

pub struct ReportService {
    storage: Arc<SeaOrmStorage>,
}

impl ReportService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// 校验并规范化过滤条件
    pub fn normalize_filter(filter: ReportFilter) -> Result<ReportFilter> {
        Ok(ReportFilter {
            report_month: filter.report_month.map(validate_month).transpose()?,
            report_year: filter.report_year.map(validate_year).transpose()?,
            section_key: filter
                .section_key
                .filter(|s| !s.trim().is_empty())
                .map(|s| validate_section(&s).map(|sec| sec.key().to_string()))
                .transpose()?,
            ..filter
        })
    }

    /// 校验复合键：月份、年份、部门以及 region / majlis 引用
    pub async fn validate_key(&self, key: ReportKey) -> Result<ReportKey> {
        let report_month = validate_month(key.report_month)?;
        let report_year = validate_year(key.report_year)?;
        let section = validate_section(&key.section_key)?;

        if self.storage.get_region(key.region_id).await?.is_none() {
            return Err(PortalError::validation(format!(
                "Region {} does not exist",
                key.region_id
            )));
        }
        let majlis = self
            .storage
            .get_majlis(key.majlis_id)
            .await?
            .ok_or_else(|| {
                PortalError::validation(format!("Majlis {} does not exist", key.majlis_id))
            })?;
        if majlis.region_id != key.region_id {
            return Err(PortalError::validation(format!(
                "Majlis {} does not belong to region {}",
                key.majlis_id, key.region_id
            )));
        }

        Ok(ReportKey {
            report_month,
            report_year,
            section_key: section.key().to_string(),
            ..key
        })
    }

    pub async fn list_reports(&self, filter: ReportFilter) -> Result<Vec<ReportRow>> {
        let filter = Self::normalize_filter(filter)?;
        self.storage.list_reports(&filter).await
    }

    pub async fn upsert_report(&self, key: ReportKey, fields: ReportFields) -> Result<ReportRow> {
        let key = self.validate_key(key).await?;
        if let Some(value) = [
            fields.meetings_held,
            fields.attendance,
            fields.members_contacted,
            fields.books_distributed,
        ]
        .into_iter()
        .flatten()
        .find(|v| *v < 0)
        {
            return Err(PortalError::validation(format!(
                "Counts cannot be negative, got {}",
                value
            )));
        }
        self.storage.upsert_report(&key, &fields).await
    }

    pub async fn list_legacy_reports(&self, filter: ReportFilter) -> Result<Vec<LegacyReport>> {
        let filter = Self::normalize_filter(filter)?;
        self.storage.list_legacy_reports(&filter).await
    }

    pub async fn upsert_legacy_report(
        &self,
        key: ReportKey,
        details: serde_json::Value,
    ) -> Result<LegacyReport> {
        if !details.is_object() {
            return Err(PortalError::validation("details must be a JSON object"));
        }
        let key = self.validate_key(key).await?;
        self.storage.upsert_legacy_report(&key, &details).await
    }

    /// 解析一组报告行（规范化优先，必要时回退到旧数据）
    pub async fn resolve(&self, filter: ReportFilter) -> Result<Vec<ResolvedReport>> {
        let filter = Self::normalize_filter(filter)?;
        let rows = self.storage.list_reports(&filter).await?;
        Ok(resolve_reports(&self.storage, rows).await)
    }

    /// 导出为 CSV
    pub async fn export(&self, query: ExportQuery) -> Result<ReportExport> {
        let section = match query.section.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(section) => validate_section(section)?,
            None => validate_section(&get_config().export.default_section)?,
        };

        let filter = ReportFilter {
            region_id: query.region_id,
            majlis_id: query.majlis_id,
            report_month: query.month,
            report_year: query.year,
            section_key: Some(section.key().to_string()),
        };
        let resolved = self.resolve(filter).await?;

        let region_names: HashMap<i32, String> = self
            .storage
            .list_regions()
            .await?
            .into_iter()
            .map(|r| (r.id, r.name))
            .collect();
        let majlis_names: HashMap<i32, String> = self
            .storage
            .list_majlis(None)
            .await?
            .into_iter()
            .map(|m| (m.id, m.name))
            .collect();

        let legacy_rows = resolved
            .iter()
            .filter(|r| matches!(r, ResolvedReport::Legacy(_)))
            .count();
        let csv_rows: Vec<CsvReportRow> = resolved
            .into_iter()
            .map(|r| {
                let source = r.source();
                let row = r.into_row();
                CsvReportRow {
                    source,
                    region: region_names
                        .get(&row.key.region_id)
                        .cloned()
                        .unwrap_or_default(),
                    majlis: majlis_names
                        .get(&row.key.majlis_id)
                        .cloned()
                        .unwrap_or_default(),
                    report_year: row.key.report_year,
                    report_month: row.key.report_month,
                    section: row.key.section_key,
                    meetings_held: row.fields.meetings_held,
                    attendance: row.fields.attendance,
                    members_contacted: row.fields.members_contacted,
                    books_distributed: row.fields.books_distributed,
                    amount_collected: row.fields.amount_collected,
                    target_amount: row.fields.target_amount,
                    remarks: row.fields.remarks,
                }
            })
            .collect();
        let rows = csv_rows.len();

        let content = tokio::task::spawn_blocking(move || write_csv(&csv_rows))
            .await
            .map_err(|e| PortalError::export_failed(format!("CSV task failed: {}", e)))??;

        let filename = export_filename(section.key(), query.year, query.month);
        info!(
            "Report export {}: {} rows ({} from legacy blobs)",
            filename, rows, legacy_rows
        );

        Ok(ReportExport {
            filename,
            content,
            rows,
        })
    }
}

/// `report-<section>-<year>-<month>.csv`，缺省的年月写作 `all`
pub fn export_filename(section: &str, year: Option<i32>, month: Option<i32>) -> String {
    let year = year.map_or_else(|| "all".to_string(), |y| y.to_string());
    let month = month.map_or_else(|| "all".to_string(), |m| format!("{:02}", m));
    format!("report-{}-{}-{}.csv", section, year, month)
}

fn write_csv(rows: &[CsvReportRow]) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(vec![]);
    if rows.is_empty() {
        // serialize 只在写第一行时输出表头
        writer.write_record([
            "source",
            "region",
            "majlis",
            "report_year",
            "report_month",
            "section",
            "meetings_held",
            "attendance",
            "members_contacted",
            "books_distributed",
            "amount_collected",
            "target_amount",
            "remarks",
        ])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    debug!("CSV writer produced {} rows", rows.len());
    writer
        .into_inner()
        .map_err(|e| PortalError::export_failed(format!("Failed to finalize CSV: {}", e.error())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_filename() {
        assert_eq!(
            export_filename("maal", Some(2024), Some(3)),
            "report-maal-2024-03.csv"
        );
        assert_eq!(export_filename("tabligh", None, None), "report-tabligh-all-all.csv");
    }

    #[test]
    fn test_empty_export_has_header() {
        let bytes = write_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("source,region,majlis,"));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_csv_row_layout() {
        let rows = vec![CsvReportRow {
            source: "legacy",
            region: "Nairobi".to_string(),
            majlis: "Eastleigh".to_string(),
            report_year: 2024,
            report_month: 3,
            section: "maal".to_string(),
            meetings_held: Some(2),
            attendance: None,
            members_contacted: None,
            books_distributed: None,
            amount_collected: Some(10.5),
            target_amount: None,
            remarks: Some("ok, done".to_string()),
        }];
        let text = String::from_utf8(write_csv(&rows).unwrap()).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().ends_with("target_amount,remarks"));
        assert_eq!(
            lines.next().unwrap(),
            "legacy,Nairobi,Eastleigh,2024,3,maal,2,,,,10.5,,\"ok, done\""
        );
    }

    #[test]
    fn test_normalize_filter_rejects_bad_month() {
        let filter = ReportFilter {
            report_month: Some(13),
            ..Default::default()
        };
        assert!(ReportService::normalize_filter(filter).is_err());

        let filter = ReportFilter {
            section_key: Some("MAAL".to_string()),
            ..Default::default()
        };
        let normalized = ReportService::normalize_filter(filter).unwrap();
        assert_eq!(normalized.section_key.as_deref(), Some("maal"));
    }
}
