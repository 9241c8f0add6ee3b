//! Monthly report storage
//!
//! `report_data` holds the normalized columns; `other_reports` keeps the
//! legacy JSON blobs under the same composite key. Both are written with a
//! single upsert on that key.

use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use tracing::debug;

use super::converters::{model_to_report_row, other_report_key, report_to_active_model};
use super::{SeaOrmStorage, db_error, retry};
use crate::errors::{PortalError, Result};
use crate::storage::models::{LegacyReport, ReportFields, ReportFilter, ReportKey, ReportRow};

use migration::entities::{other_report, report_data};

fn report_condition(filter: &ReportFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(v) = filter.region_id {
        condition = condition.add(report_data::Column::RegionId.eq(v));
    }
    if let Some(v) = filter.majlis_id {
        condition = condition.add(report_data::Column::MajlisId.eq(v));
    }
    if let Some(v) = filter.report_month {
        condition = condition.add(report_data::Column::ReportMonth.eq(v));
    }
    if let Some(v) = filter.report_year {
        condition = condition.add(report_data::Column::ReportYear.eq(v));
    }
    if let Some(v) = filter.section_key.as_deref() {
        condition = condition.add(report_data::Column::SectionKey.eq(v));
    }
    condition
}

fn legacy_condition(filter: &ReportFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(v) = filter.region_id {
        condition = condition.add(other_report::Column::RegionId.eq(v));
    }
    if let Some(v) = filter.majlis_id {
        condition = condition.add(other_report::Column::MajlisId.eq(v));
    }
    if let Some(v) = filter.report_month {
        condition = condition.add(other_report::Column::ReportMonth.eq(v));
    }
    if let Some(v) = filter.report_year {
        condition = condition.add(other_report::Column::ReportYear.eq(v));
    }
    if let Some(v) = filter.section_key.as_deref() {
        condition = condition.add(other_report::Column::SectionKey.eq(v));
    }
    condition
}

fn legacy_key_condition(key: &ReportKey) -> Condition {
    Condition::all()
        .add(other_report::Column::RegionId.eq(key.region_id))
        .add(other_report::Column::MajlisId.eq(key.majlis_id))
        .add(other_report::Column::ReportMonth.eq(key.report_month))
        .add(other_report::Column::ReportYear.eq(key.report_year))
        .add(other_report::Column::SectionKey.eq(key.section_key.as_str()))
}

fn model_to_legacy(model: other_report::Model) -> LegacyReport {
    let key = other_report_key(&model);
    // 非法 JSON 原样作为字符串返回
    let details = serde_json::from_str(&model.details)
        .unwrap_or_else(|_| serde_json::Value::String(model.details.clone()));
    LegacyReport {
        id: model.id,
        key,
        details,
        updated_at: model.updated_at,
    }
}

impl SeaOrmStorage {
    pub async fn list_reports(&self, filter: &ReportFilter) -> Result<Vec<ReportRow>> {
        let db = &self.db;
        let condition = report_condition(filter);
        let models = retry::with_retry("list_reports", self.retry_config, || async {
            report_data::Entity::find()
                .filter(condition.clone())
                .order_by_asc(report_data::Column::RegionId)
                .order_by_asc(report_data::Column::MajlisId)
                .order_by_asc(report_data::Column::ReportYear)
                .order_by_asc(report_data::Column::ReportMonth)
                .order_by_asc(report_data::Column::SectionKey)
                .all(db)
                .await
        })
        .await
        .map_err(|e| db_error("list reports", e))?;

        Ok(models.into_iter().map(model_to_report_row).collect())
    }

    pub async fn get_report(&self, key: &ReportKey) -> Result<Option<ReportRow>> {
        let filter = ReportFilter {
            region_id: Some(key.region_id),
            majlis_id: Some(key.majlis_id),
            report_month: Some(key.report_month),
            report_year: Some(key.report_year),
            section_key: Some(key.section_key.clone()),
        };
        let model = report_data::Entity::find()
            .filter(report_condition(&filter))
            .one(&self.db)
            .await
            .map_err(|e| db_error("get report", e))?;

        Ok(model.map(model_to_report_row))
    }

    /// 以复合键 upsert 规范化报告行
    pub async fn upsert_report(&self, key: &ReportKey, fields: &ReportFields) -> Result<ReportRow> {
        let db = &self.db;
        let model = report_to_active_model(key, fields, Utc::now());
        let on_conflict = OnConflict::columns([
            report_data::Column::RegionId,
            report_data::Column::MajlisId,
            report_data::Column::ReportMonth,
            report_data::Column::ReportYear,
            report_data::Column::SectionKey,
        ])
        .update_columns([
            report_data::Column::MeetingsHeld,
            report_data::Column::Attendance,
            report_data::Column::MembersContacted,
            report_data::Column::BooksDistributed,
            report_data::Column::AmountCollected,
            report_data::Column::TargetAmount,
            report_data::Column::Remarks,
            report_data::Column::UpdatedAt,
        ])
        .to_owned();

        retry::with_retry("upsert_report", self.retry_config, || async {
            report_data::Entity::insert(model.clone())
                .on_conflict(on_conflict.clone())
                .exec_without_returning(db)
                .await
        })
        .await
        .map_err(|e| db_error("upsert report", e))?;

        debug!(
            "Report upserted: region={} majlis={} {}/{} {}",
            key.region_id, key.majlis_id, key.report_month, key.report_year, key.section_key
        );

        self.get_report(key)
            .await?
            .ok_or_else(|| PortalError::database_operation("report row missing after upsert"))
    }

    // ---- legacy blobs ----

    pub async fn list_legacy_reports(&self, filter: &ReportFilter) -> Result<Vec<LegacyReport>> {
        let db = &self.db;
        let condition = legacy_condition(filter);
        let models = retry::with_retry("list_legacy_reports", self.retry_config, || async {
            other_report::Entity::find()
                .filter(condition.clone())
                .order_by_asc(other_report::Column::RegionId)
                .order_by_asc(other_report::Column::MajlisId)
                .order_by_asc(other_report::Column::ReportYear)
                .order_by_asc(other_report::Column::ReportMonth)
                .all(db)
                .await
        })
        .await
        .map_err(|e| db_error("list legacy reports", e))?;

        Ok(models.into_iter().map(model_to_legacy).collect())
    }

    /// 按复合键读取旧版 JSON 原文
    pub async fn find_legacy_details(&self, key: &ReportKey) -> Result<Option<String>> {
        let db = &self.db;
        let condition = legacy_key_condition(key);
        let model = retry::with_retry("find_legacy_details", self.retry_config, || async {
            other_report::Entity::find()
                .filter(condition.clone())
                .one(db)
                .await
        })
        .await
        .map_err(|e| db_error("find legacy report", e))?;

        Ok(model.map(|m| m.details))
    }

    pub async fn upsert_legacy_report(
        &self,
        key: &ReportKey,
        details: &serde_json::Value,
    ) -> Result<LegacyReport> {
        let db = &self.db;
        let model = other_report::ActiveModel {
            id: NotSet,
            region_id: Set(key.region_id),
            majlis_id: Set(key.majlis_id),
            report_month: Set(key.report_month),
            report_year: Set(key.report_year),
            section_key: Set(key.section_key.clone()),
            details: Set(serde_json::to_string(details)?),
            updated_at: Set(Utc::now()),
        };
        let on_conflict = OnConflict::columns([
            other_report::Column::RegionId,
            other_report::Column::MajlisId,
            other_report::Column::ReportMonth,
            other_report::Column::ReportYear,
            other_report::Column::SectionKey,
        ])
        .update_columns([other_report::Column::Details, other_report::Column::UpdatedAt])
        .to_owned();

        retry::with_retry("upsert_legacy_report", self.retry_config, || async {
            other_report::Entity::insert(model.clone())
                .on_conflict(on_conflict.clone())
                .exec_without_returning(db)
                .await
        })
        .await
        .map_err(|e| db_error("upsert legacy report", e))?;

        let stored = other_report::Entity::find()
            .filter(legacy_key_condition(key))
            .one(db)
            .await
            .map_err(|e| db_error("get legacy report", e))?
            .ok_or_else(|| {
                PortalError::database_operation("legacy report missing after upsert")
            })?;

        Ok(model_to_legacy(stored))
    }
}
