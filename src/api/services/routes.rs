//! API 路由配置
//!
//! 按资源拆分 scope，`configure` 负责挂载共享数据与全部路由。

use actix_web::web;

use crate::services::PortalServices;

use super::events::{
    activate_event, create_event, list_attendance, list_events, mark_attendance,
    unmark_attendance,
};
use super::health::{AppStartTime, get_stats, health_check};
use super::helpers::{json_config, query_config};
use super::participants::{
    create_participant, delete_participant, get_participant, list_participants,
    update_participant,
};
use super::reports::{
    export_reports, list_legacy_reports, list_reports, upsert_legacy_report, upsert_report,
};
use super::taxonomy::{
    create_majlis, create_region, delete_majlis, delete_region, get_majlis, get_region,
    list_majlis, list_regions, update_majlis, update_region,
};
use super::users::{create_user, delete_user, list_users, login_rate_limiter, sub_login, update_user};

/// 区域路由 `/regions`
pub fn regions_routes() -> actix_web::Scope {
    web::scope("/regions")
        .route("", web::get().to(list_regions))
        .route("", web::post().to(create_region))
        .route("/{id}", web::get().to(get_region))
        .route("/{id}", web::put().to(update_region))
        .route("/{id}", web::delete().to(delete_region))
}

/// Majlis 路由 `/majlis`
pub fn majlis_routes() -> actix_web::Scope {
    web::scope("/majlis")
        .route("", web::get().to(list_majlis))
        .route("", web::post().to(create_majlis))
        .route("/{id}", web::get().to(get_majlis))
        .route("/{id}", web::put().to(update_majlis))
        .route("/{id}", web::delete().to(delete_majlis))
}

pub fn participants_routes() -> actix_web::Scope {
    web::scope("/participants")
        .route("", web::get().to(list_participants))
        .route("", web::post().to(create_participant))
        .route("/{id}", web::get().to(get_participant))
        .route("/{id}", web::put().to(update_participant))
        .route("/{id}", web::delete().to(delete_participant))
}

pub fn events_routes() -> actix_web::Scope {
    web::scope("/events")
        .route("", web::get().to(list_events))
        .route("", web::post().to(create_event))
        .route("/{id}/activate", web::post().to(activate_event))
}

/// 出勤路由 `/event-attendance`
pub fn attendance_routes() -> actix_web::Scope {
    web::scope("/event-attendance")
        .route("", web::get().to(list_attendance))
        .route("", web::post().to(mark_attendance))
        .route("", web::delete().to(unmark_attendance))
}

/// 报告路由 `/report-data` 与 `/other-reports`
pub fn reports_routes() -> actix_web::Scope {
    web::scope("/report-data")
        .route("", web::get().to(list_reports))
        .route("", web::post().to(upsert_report))
        .route("/export", web::get().to(export_reports))
}

pub fn legacy_reports_routes() -> actix_web::Scope {
    web::scope("/other-reports")
        .route("", web::get().to(list_legacy_reports))
        .route("", web::post().to(upsert_legacy_report))
}

pub fn users_routes() -> actix_web::Scope {
    web::scope("/users")
        .route("", web::get().to(list_users))
        .route("", web::post().to(create_user))
        .route("/{id}", web::put().to(update_user))
        .route("/{id}", web::delete().to(delete_user))
}

/// 认证路由 `/auth`，子账户登录带限流
pub fn auth_routes() -> actix_web::Scope {
    let login = web::post().to(sub_login);
    let login = match login_rate_limiter() {
        Some(limiter) => login.wrap(limiter),
        None => login,
    };
    web::scope("/auth").route("/sub-login", login)
}

/// 挂载共享数据与全部路由
pub fn configure(cfg: &mut web::ServiceConfig, services: &PortalServices, started: &AppStartTime) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(web::Data::new(services.storage.clone()))
        .app_data(web::Data::new(services.regions.clone()))
        .app_data(web::Data::new(services.majlis.clone()))
        .app_data(web::Data::new(services.participants.clone()))
        .app_data(web::Data::new(services.events.clone()))
        .app_data(web::Data::new(services.reports.clone()))
        .app_data(web::Data::new(services.users.clone()))
        .app_data(web::Data::new(started.clone()))
        .route("/health", web::get().to(health_check))
        .route("/health", web::head().to(health_check))
        .route("/stats", web::get().to(get_stats))
        .service(regions_routes())
        .service(majlis_routes())
        .service(participants_routes())
        .service(events_routes())
        .service(attendance_routes())
        .service(reports_routes())
        .service(legacy_reports_routes())
        .service(users_routes())
        .service(auth_routes());
}
