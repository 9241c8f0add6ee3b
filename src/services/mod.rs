//! Service layer for business logic
//!
//! Business rules per entity, shared by the HTTP handlers and the CLI.

mod attendance_service;
mod participant_service;
mod region_service;
pub mod report_resolver;
mod report_service;
mod user_service;

pub use attendance_service::*;
pub use participant_service::*;
pub use region_service::*;
pub use report_resolver::ResolvedReport;
pub use report_service::*;
pub use user_service::*;

use std::sync::Arc;

use crate::storage::SeaOrmStorage;

/// 所有业务服务的集合，HTTP 与 CLI 共用同一个存储
#[derive(Clone)]
pub struct PortalServices {
    pub storage: Arc<SeaOrmStorage>,
    pub regions: Arc<RegionService>,
    pub majlis: Arc<MajlisService>,
    pub participants: Arc<ParticipantService>,
    pub events: Arc<EventService>,
    pub reports: Arc<ReportService>,
    pub users: Arc<UserService>,
}

impl PortalServices {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self {
            regions: Arc::new(RegionService::new(storage.clone())),
            majlis: Arc::new(MajlisService::new(storage.clone())),
            participants: Arc::new(ParticipantService::new(storage.clone())),
            events: Arc::new(EventService::new(storage.clone())),
            reports: Arc::new(ReportService::new(storage.clone())),
            users: Arc::new(UserService::new(storage.clone())),
            storage,
        }
    }
}
