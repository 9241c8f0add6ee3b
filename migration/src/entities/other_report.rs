use sea_orm::entity::prelude::*;

/// 旧版报告存储：同一自然键下的 JSON 文本
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "other_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub region_id: i32,
    pub majlis_id: i32,
    pub report_month: i32,
    pub report_year: i32,
    pub section_key: String,
    #[sea_orm(column_type = "Text")]
    pub details: String,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
