pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20260301_000001_taxonomy;
mod m20260301_000002_participants_events;
mod m20260302_000001_reports;
mod m20260303_000001_sub_users;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_taxonomy::Migration),
            Box::new(m20260301_000002_participants_events::Migration),
            Box::new(m20260302_000001_reports::Migration),
            Box::new(m20260303_000001_sub_users::Migration),
        ]
    }
}
