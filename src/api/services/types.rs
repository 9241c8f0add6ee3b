//! API 类型定义
//!
//! 请求与响应统一使用 camelCase 键。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::services::{CreateUserRequest, ParticipantInput, UpdateUserRequest};
use crate::storage::{ReportFields, ReportFilter, ReportKey, SubUser, UserRole};

use super::error_code::ErrorCode;

// ---- envelopes ----

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub code: ErrorCode,
}

#[derive(Serialize, Debug)]
pub struct ListResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, page_size: u64, total: u64) -> Self {
        Self {
            page,
            page_size,
            total,
            total_pages: total.div_ceil(page_size.max(1)),
        }
    }
}

// ---- regions / majlis ----

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegionRequest {
    #[serde(default)]
    pub name: String,
    pub code: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateMajlisRequest {
    #[serde(default)]
    pub name: String,
    pub code: Option<String>,
    pub region_id: Option<i32>,
}

/// PUT /regions/{id} 与 PUT /majlis/{id} 共用
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaxonomyBody {
    pub name: Option<String>,
    pub code: Option<String>,
    pub region_id: Option<i32>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct MajlisQuery {
    pub region_id: Option<i32>,
}

// ---- participants ----

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;
/// 页码上限，保证 `page * pageSize` 不会溢出
pub const MAX_PAGE: u64 = u32::MAX as u64;

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub search: Option<String>,
    pub region_id: Option<i32>,
    pub majlis_id: Option<i32>,
    pub category: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantBody {
    pub name: Option<String>,
    pub father_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub joined_on: Option<NaiveDate>,
    pub category: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub region_id: Option<i32>,
    pub majlis_id: Option<i32>,
    pub is_moosi: Option<bool>,
    pub reads_quran: Option<bool>,
    pub offers_salat: Option<bool>,
    pub physically_fit: Option<bool>,
}

impl From<ParticipantBody> for ParticipantInput {
    fn from(body: ParticipantBody) -> Self {
        Self {
            name: body.name,
            father_name: body.father_name,
            date_of_birth: body.date_of_birth,
            joined_on: body.joined_on,
            category: body.category,
            phone: body.phone,
            email: body.email,
            address: body.address,
            region_id: body.region_id,
            majlis_id: body.majlis_id,
            is_moosi: body.is_moosi,
            reads_quran: body.reads_quran,
            offers_salat: body.offers_salat,
            physically_fit: body.physically_fit,
        }
    }
}

// ---- events / attendance ----

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[serde(default)]
    pub name: String,
    pub event_date: Option<NaiveDate>,
    pub active: Option<bool>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQuery {
    pub event_id: Option<i32>,
    pub participant_id: Option<i32>,
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    pub participant_id: Option<i32>,
    pub event_id: Option<i32>,
    pub present: Option<bool>,
}

// ---- reports ----

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub region_id: Option<i32>,
    pub majlis_id: Option<i32>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub section: Option<String>,
}

impl From<ReportQuery> for ReportFilter {
    fn from(query: ReportQuery) -> Self {
        Self {
            region_id: query.region_id,
            majlis_id: query.majlis_id,
            report_month: query.month,
            report_year: query.year,
            section_key: query.section,
        }
    }
}

/// 报告复合键（请求体中各字段可缺省，缺失时返回 400）
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReportKeyBody {
    pub region_id: Option<i32>,
    pub majlis_id: Option<i32>,
    pub report_month: Option<i32>,
    pub report_year: Option<i32>,
    #[serde(alias = "section")]
    pub section_key: Option<String>,
}

impl ReportKeyBody {
    pub fn into_key(self) -> crate::errors::Result<ReportKey> {
        use crate::errors::PortalError;
        let missing = |field: &str| PortalError::validation(format!("{} is required", field));
        Ok(ReportKey {
            region_id: self.region_id.ok_or_else(|| missing("regionId"))?,
            majlis_id: self.majlis_id.ok_or_else(|| missing("majlisId"))?,
            report_month: self.report_month.ok_or_else(|| missing("reportMonth"))?,
            report_year: self.report_year.ok_or_else(|| missing("reportYear"))?,
            section_key: self
                .section_key
                .filter(|s| !s.trim().is_empty())
                .ok_or_else(|| missing("sectionKey"))?,
        })
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ReportUpsertRequest {
    #[serde(flatten)]
    pub key: ReportKeyBody,
    #[serde(flatten)]
    pub fields: ReportFields,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct LegacyReportRequest {
    #[serde(flatten)]
    pub key: ReportKeyBody,
    #[serde(default)]
    pub details: serde_json::Value,
}

// ---- users / auth ----

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody {
    #[serde(default)]
    pub name: String,
    pub role: Option<String>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl From<CreateUserBody> for CreateUserRequest {
    fn from(body: CreateUserBody) -> Self {
        Self {
            name: body.name,
            role: body.role,
            username: body.username,
            password: body.password,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserBody {
    pub name: Option<String>,
    pub role: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl From<UpdateUserBody> for UpdateUserRequest {
    fn from(body: UpdateUserBody) -> Self {
        Self {
            name: body.name,
            role: body.role,
            username: body.username,
            password: body.password,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct LoginCredentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// 对外的子账户信息，不包含密码哈希
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub role: UserRole,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl From<SubUser> for UserResponse {
    fn from(user: SubUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            role: user.role,
            username: user.username,
            created_at: user.created_at,
        }
    }
}

// ---- health ----

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub backend: String,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
    pub response_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pagination_pages() {
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 20, 41).total_pages, 3);
    }

    #[test]
    fn test_report_upsert_flattened() {
        let body: ReportUpsertRequest = serde_json::from_value(json!({
            "regionId": 1,
            "majlisId": 2,
            "reportMonth": 5,
            "reportYear": 2024,
            "section": "maal",
            "amountCollected": 12.5,
            "remarks": "ok"
        }))
        .unwrap();
        let key = body.key.into_key().unwrap();
        assert_eq!(key.section_key, "maal");
        assert_eq!(body.fields.amount_collected, Some(12.5));
        assert_eq!(body.fields.meetings_held, None);
    }

    #[test]
    fn test_missing_key_field() {
        let body = ReportKeyBody {
            region_id: Some(1),
            ..Default::default()
        };
        let err = body.into_key().unwrap_err();
        assert_eq!(err.message(), "majlisId is required");
    }

    #[test]
    fn test_user_response_has_no_hash() {
        let user = SubUser {
            id: 1,
            name: "Amina".to_string(),
            role: UserRole::Regional,
            username: "amina".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };
        let value = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert!(value.get("passwordHash").is_none());
        assert_eq!(value["role"], "regional");
    }
}
