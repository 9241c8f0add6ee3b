use std::sync::Arc;

use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::{
    Attendance, Event, LegacyReport, Majlis, Participant, ParticipantCategory, ParticipantDraft,
    ParticipantFilter, PortalStats, Region, ReportFields, ReportFilter, ReportKey, ReportRow,
    ReportSection, SubUser, UserRole,
};

pub struct StorageFactory;

impl StorageFactory {
    /// 按全局配置创建存储（类型由 URL 推断）并执行迁移
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let database_url = &config.database.database_url;

        let backend_type = backend::infer_backend_from_url(database_url)?;

        let storage = SeaOrmStorage::new(database_url, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
