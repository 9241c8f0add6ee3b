use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Region::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Region::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Region::Name).string().not_null())
                    .col(ColumnDef::new(Region::Code).string_len(10).not_null())
                    .col(
                        ColumnDef::new(Region::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // code 唯一约束：分配器依赖它来判断冲突
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_regions_code")
                    .table(Region::Table)
                    .col(Region::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Majlis::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Majlis::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Majlis::Name).string().not_null())
                    .col(ColumnDef::new(Majlis::RegionId).integer().not_null())
                    .col(ColumnDef::new(Majlis::Code).string_len(10).not_null())
                    .col(
                        ColumnDef::new(Majlis::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_majlis_region")
                            .from(Majlis::Table, Majlis::RegionId)
                            .to(Region::Table, Region::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_majlis_code")
                    .table(Majlis::Table)
                    .col(Majlis::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_majlis_region")
                    .table(Majlis::Table)
                    .col(Majlis::RegionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Majlis::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Region::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Region {
    #[sea_orm(iden = "regions")]
    Table,
    Id,
    Name,
    Code,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Majlis {
    #[sea_orm(iden = "majlis")]
    Table,
    Id,
    Name,
    RegionId,
    Code,
    CreatedAt,
}
