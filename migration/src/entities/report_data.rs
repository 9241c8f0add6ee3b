use sea_orm::entity::prelude::*;

/// 规范化的月度报告行，自然键为 (region, majlis, month, year, section)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "report_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub region_id: i32,
    pub majlis_id: i32,
    pub report_month: i32,
    pub report_year: i32,
    pub section_key: String,
    pub meetings_held: Option<i32>,
    pub attendance: Option<i32>,
    pub members_contacted: Option<i32>,
    pub books_distributed: Option<i32>,
    #[sea_orm(column_type = "Double", nullable)]
    pub amount_collected: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub target_amount: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
