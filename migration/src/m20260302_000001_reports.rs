use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReportData::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReportData::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ReportData::RegionId).integer().not_null())
                    .col(ColumnDef::new(ReportData::MajlisId).integer().not_null())
                    .col(ColumnDef::new(ReportData::ReportMonth).integer().not_null())
                    .col(ColumnDef::new(ReportData::ReportYear).integer().not_null())
                    .col(ColumnDef::new(ReportData::SectionKey).string().not_null())
                    .col(ColumnDef::new(ReportData::MeetingsHeld).integer().null())
                    .col(ColumnDef::new(ReportData::Attendance).integer().null())
                    .col(ColumnDef::new(ReportData::MembersContacted).integer().null())
                    .col(ColumnDef::new(ReportData::BooksDistributed).integer().null())
                    .col(ColumnDef::new(ReportData::AmountCollected).double().null())
                    .col(ColumnDef::new(ReportData::TargetAmount).double().null())
                    .col(ColumnDef::new(ReportData::Remarks).text().null())
                    .col(
                        ColumnDef::new(ReportData::UpdatedAt)
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
                    .name("uq_report_data_key")
                    .table(ReportData::Table)
                    .col(ReportData::RegionId)
                    .col(ReportData::MajlisId)
                    .col(ReportData::ReportMonth)
                    .col(ReportData::ReportYear)
                    .col(ReportData::SectionKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(OtherReport::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtherReport::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OtherReport::RegionId).integer().not_null())
                    .col(ColumnDef::new(OtherReport::MajlisId).integer().not_null())
                    .col(ColumnDef::new(OtherReport::ReportMonth).integer().not_null())
                    .col(ColumnDef::new(OtherReport::ReportYear).integer().not_null())
                    .col(ColumnDef::new(OtherReport::SectionKey).string().not_null())
                    .col(ColumnDef::new(OtherReport::Details).text().not_null())
                    .col(
                        ColumnDef::new(OtherReport::UpdatedAt)
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
                    .name("uq_other_reports_key")
                    .table(OtherReport::Table)
                    .col(OtherReport::RegionId)
                    .col(OtherReport::MajlisId)
                    .col(OtherReport::ReportMonth)
                    .col(OtherReport::ReportYear)
                    .col(OtherReport::SectionKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtherReport::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ReportData::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ReportData {
    #[sea_orm(iden = "report_data")]
    Table,
    Id,
    RegionId,
    MajlisId,
    ReportMonth,
    ReportYear,
    SectionKey,
    MeetingsHeld,
    Attendance,
    MembersContacted,
    BooksDistributed,
    AmountCollected,
    TargetAmount,
    Remarks,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OtherReport {
    #[sea_orm(iden = "other_reports")]
    Table,
    Id,
    RegionId,
    MajlisId,
    ReportMonth,
    ReportYear,
    SectionKey,
    Details,
    UpdatedAt,
}
