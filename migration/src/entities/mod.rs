pub mod event;
pub mod event_attendance;
pub mod majlis;
pub mod other_report;
pub mod participant;
pub mod region;
pub mod report_data;
pub mod sub_user;

pub use event::Entity as EventEntity;
pub use event_attendance::Entity as EventAttendanceEntity;
pub use majlis::Entity as MajlisEntity;
pub use other_report::Entity as OtherReportEntity;
pub use participant::Entity as ParticipantEntity;
pub use region::Entity as RegionEntity;
pub use report_data::Entity as ReportDataEntity;
pub use sub_user::Entity as SubUserEntity;
