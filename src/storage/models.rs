use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Majlis {
    pub id: i32,
    pub name: String,
    pub region_id: i32,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

/// 成员分类
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ParticipantCategory {
    Khuddam,
    Atfal,
    Ansar,
    Lajna,
    Nasirat,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: i32,
    pub name: String,
    pub father_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub joined_on: Option<NaiveDate>,
    pub category: ParticipantCategory,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub region_id: Option<i32>,
    pub majlis_id: Option<i32>,
    pub is_moosi: bool,
    pub reads_quran: bool,
    pub offers_salat: bool,
    pub physically_fit: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 参与者写入数据（创建与更新共用）
#[derive(Debug, Clone, Default)]
pub struct ParticipantDraft {
    pub name: String,
    pub father_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub joined_on: Option<NaiveDate>,
    pub category: ParticipantCategory,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub region_id: Option<i32>,
    pub majlis_id: Option<i32>,
    pub is_moosi: bool,
    pub reads_quran: bool,
    pub offers_salat: bool,
    pub physically_fit: bool,
}

/// 参与者过滤条件
#[derive(Default, Clone, Debug)]
pub struct ParticipantFilter {
    /// 模糊搜索姓名、电话或邮箱
    pub search: Option<String>,
    pub region_id: Option<i32>,
    pub majlis_id: Option<i32>,
    pub category: Option<ParticipantCategory>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: i32,
    pub name: String,
    pub event_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i32,
    pub event_id: i32,
    pub participant_id: i32,
    pub present: bool,
    pub marked_at: DateTime<Utc>,
}

/// 报告所属部门
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReportSection {
    Tajnid,
    Tabligh,
    Maal,
    Talim,
    Tarbiyat,
    Ishaat,
    KhidmatEKhalq,
    SehatEJismani,
    UmoorETulaba,
    TahrikEJadid,
    WaqfEJadid,
}

impl ReportSection {
    pub fn all_keys() -> Vec<&'static str> {
        Self::iter().map(|s| s.key()).collect()
    }

    pub fn key(self) -> &'static str {
        self.into()
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::from_str(key.trim()).ok()
    }
}

/// 报告自然键
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportKey {
    pub region_id: i32,
    pub majlis_id: i32,
    pub report_month: i32,
    pub report_year: i32,
    pub section_key: String,
}

/// 报告的非键字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFields {
    pub meetings_held: Option<i32>,
    pub attendance: Option<i32>,
    pub members_contacted: Option<i32>,
    pub books_distributed: Option<i32>,
    pub amount_collected: Option<f64>,
    pub target_amount: Option<f64>,
    pub remarks: Option<String>,
}

impl ReportFields {
    /// 所有非键字段均为空
    pub fn is_empty(&self) -> bool {
        self.meetings_held.is_none()
            && self.attendance.is_none()
            && self.members_contacted.is_none()
            && self.books_distributed.is_none()
            && self.amount_collected.is_none()
            && self.target_amount.is_none()
            && self.remarks.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub id: i32,
    #[serde(flatten)]
    pub key: ReportKey,
    #[serde(flatten)]
    pub fields: ReportFields,
    pub updated_at: DateTime<Utc>,
}

/// 旧版 JSON 报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyReport {
    pub id: i32,
    #[serde(flatten)]
    pub key: ReportKey,
    pub details: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// 报告查询条件
#[derive(Default, Clone, Debug)]
pub struct ReportFilter {
    pub region_id: Option<i32>,
    pub majlis_id: Option<i32>,
    pub report_month: Option<i32>,
    pub report_year: Option<i32>,
    pub section_key: Option<String>,
}

/// 子账户角色
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum UserRole {
    Admin,
    Regional,
    Majlis,
    #[default]
    Viewer,
}

/// 子账户（包含密码哈希，不直接序列化给客户端）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubUser {
    pub id: i32,
    pub name: String,
    pub role: UserRole,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalStats {
    pub regions: u64,
    pub majlis: u64,
    pub participants: u64,
    pub sub_users: u64,
    pub active_event_id: Option<i32>,
    pub active_event_present: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_keys_round_trip() {
        for section in ReportSection::iter() {
            assert_eq!(ReportSection::from_key(section.key()), Some(section));
            assert_eq!(section.as_ref(), section.key());
        }
        assert_eq!(ReportSection::from_key(" MAAL "), Some(ReportSection::Maal));
        assert_eq!(ReportSection::from_key("finance"), None);
        assert_eq!(ReportSection::KhidmatEKhalq.key(), "khidmat_e_khalq");
        assert_eq!(ReportSection::all_keys().len(), 11);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(
            ParticipantCategory::from_str("Khuddam").unwrap(),
            ParticipantCategory::Khuddam
        );
        assert!(ParticipantCategory::from_str("unknown").is_err());
    }

    #[test]
    fn test_report_fields_empty() {
        assert!(ReportFields::default().is_empty());
        let fields = ReportFields {
            remarks: Some(String::new()),
            ..Default::default()
        };
        assert!(!fields.is_empty());
    }
}
