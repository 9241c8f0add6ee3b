use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Participant::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participant::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Participant::Name).string().not_null())
                    .col(ColumnDef::new(Participant::FatherName).string().null())
                    .col(ColumnDef::new(Participant::DateOfBirth).date().null())
                    .col(ColumnDef::new(Participant::JoinedOn).date().null())
                    .col(
                        ColumnDef::new(Participant::Category)
                            .string()
                            .not_null()
                            .default("other"),
                    )
                    .col(ColumnDef::new(Participant::Phone).string().null())
                    .col(ColumnDef::new(Participant::Email).string().null())
                    .col(ColumnDef::new(Participant::Address).text().null())
                    .col(ColumnDef::new(Participant::RegionId).integer().null())
                    .col(ColumnDef::new(Participant::MajlisId).integer().null())
                    .col(
                        ColumnDef::new(Participant::IsMoosi)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Participant::ReadsQuran)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Participant::OffersSalat)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Participant::PhysicallyFit)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Participant::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participant::UpdatedAt)
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
                    .name("idx_participants_majlis")
                    .table(Participant::Table)
                    .col(Participant::MajlisId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_participants_name")
                    .table(Participant::Table)
                    .col(Participant::Name)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Event::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Event::Name).string().not_null())
                    .col(ColumnDef::new(Event::EventDate).date().null())
                    .col(
                        ColumnDef::new(Event::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Event::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventAttendance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventAttendance::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EventAttendance::EventId).integer().not_null())
                    .col(
                        ColumnDef::new(EventAttendance::ParticipantId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventAttendance::Present)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(EventAttendance::MarkedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // (event_id, participant_id) 唯一，用于 upsert
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_attendance_event_participant")
                    .table(EventAttendance::Table)
                    .col(EventAttendance::EventId)
                    .col(EventAttendance::ParticipantId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventAttendance::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Participant::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Participant {
    #[sea_orm(iden = "participants")]
    Table,
    Id,
    Name,
    FatherName,
    DateOfBirth,
    JoinedOn,
    Category,
    Phone,
    Email,
    Address,
    RegionId,
    MajlisId,
    IsMoosi,
    ReadsQuran,
    OffersSalat,
    PhysicallyFit,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Event {
    #[sea_orm(iden = "events")]
    Table,
    Id,
    Name,
    EventDate,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EventAttendance {
    #[sea_orm(iden = "event_attendance")]
    Table,
    Id,
    EventId,
    ParticipantId,
    Present,
    MarkedAt,
}
