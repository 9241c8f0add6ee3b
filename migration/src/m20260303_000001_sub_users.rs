use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubUser::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubUser::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SubUser::Name).string().not_null())
                    .col(
                        ColumnDef::new(SubUser::Role)
                            .string()
                            .not_null()
                            .default("viewer"),
                    )
                    .col(ColumnDef::new(SubUser::Username).string().not_null())
                    .col(ColumnDef::new(SubUser::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(SubUser::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_sub_users_username")
                    .table(SubUser::Table)
                    .col(SubUser::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uq_sub_users_username").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SubUser::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SubUser {
    #[sea_orm(iden = "sub_users")]
    Table,
    Id,
    Name,
    Role,
    Username,
    PasswordHash,
    CreatedAt,
}
