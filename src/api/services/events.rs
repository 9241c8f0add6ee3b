//! Event 与出勤端点

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::errors::PortalError;
use crate::services::EventService;

use super::helpers::{api_result, error_from_portal, list_response};
use super::types::{AttendanceQuery, CreateEventRequest, MarkAttendanceRequest};

pub async fn list_events(service: web::Data<Arc<EventService>>) -> HttpResponse {
    match service.list_events().await {
        Ok(events) => list_response(events, None),
        Err(e) => error_from_portal(&e),
    }
}

pub async fn create_event(
    body: web::Json<CreateEventRequest>,
    service: web::Data<Arc<EventService>>,
) -> HttpResponse {
    let body = body.into_inner();
    api_result(
        service
            .create_event(&body.name, body.event_date, body.active.unwrap_or(false))
            .await,
        StatusCode::CREATED,
        "event",
    )
}

pub async fn activate_event(
    path: web::Path<i32>,
    service: web::Data<Arc<EventService>>,
) -> HttpResponse {
    api_result(
        service.activate_event(path.into_inner()).await,
        StatusCode::OK,
        "event",
    )
}

/// GET /event-attendance：响应带上实际使用的事件
pub async fn list_attendance(
    query: web::Query<AttendanceQuery>,
    service: web::Data<Arc<EventService>>,
) -> HttpResponse {
    match service.list_attendance(query.event_id).await {
        Ok((event, rows)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "event": event,
            "data": rows,
        })),
        Err(e) => error_from_portal(&e),
    }
}

pub async fn mark_attendance(
    body: web::Json<MarkAttendanceRequest>,
    service: web::Data<Arc<EventService>>,
) -> HttpResponse {
    let body = body.into_inner();
    let Some(participant_id) = body.participant_id else {
        return error_from_portal(&PortalError::validation("participantId is required"));
    };
    api_result(
        service
            .mark_attendance(participant_id, body.event_id, body.present.unwrap_or(true))
            .await,
        StatusCode::OK,
        "attendance",
    )
}

pub async fn unmark_attendance(
    query: web::Query<AttendanceQuery>,
    service: web::Data<Arc<EventService>>,
) -> HttpResponse {
    let Some(participant_id) = query.participant_id else {
        return error_from_portal(&PortalError::validation("participantId is required"));
    };
    match service
        .unmark_attendance(participant_id, query.event_id)
        .await
    {
        Ok(removed) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "removed": removed,
        })),
        Err(e) => error_from_portal(&e),
    }
}
