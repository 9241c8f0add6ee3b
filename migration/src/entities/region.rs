use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "regions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub code: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::majlis::Entity")]
    Majlis,
}

impl Related<super::majlis::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Majlis.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
