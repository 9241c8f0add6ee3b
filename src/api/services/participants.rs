//! Participant 端点

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::services::{ParticipantService, parse_category};
use crate::storage::ParticipantFilter;
use crate::utils::validators::optional_text;

use super::helpers::{api_result, error_from_portal, list_response, ok_response};
use super::types::{
    DEFAULT_PAGE_SIZE, MAX_PAGE, MAX_PAGE_SIZE, Pagination, ParticipantBody, ParticipantQuery,
};

pub async fn list_participants(
    query: web::Query<ParticipantQuery>,
    service: web::Data<Arc<ParticipantService>>,
) -> HttpResponse {
    let query = query.into_inner();
    let page = query.page.unwrap_or(1).clamp(1, MAX_PAGE);
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let category = match optional_text(query.category) {
        Some(c) => match parse_category(&c) {
            Ok(category) => Some(category),
            Err(e) => return error_from_portal(&e),
        },
        None => None,
    };
    let filter = ParticipantFilter {
        search: optional_text(query.search),
        region_id: query.region_id,
        majlis_id: query.majlis_id,
        category,
    };

    match service.list_participants(page, page_size, &filter).await {
        Ok((participants, total)) => list_response(
            participants,
            Some(Pagination::new(page, page_size, total)),
        ),
        Err(e) => error_from_portal(&e),
    }
}

pub async fn get_participant(
    path: web::Path<i32>,
    service: web::Data<Arc<ParticipantService>>,
) -> HttpResponse {
    api_result(
        service.get_participant(path.into_inner()).await,
        StatusCode::OK,
        "participant",
    )
}

pub async fn create_participant(
    body: web::Json<ParticipantBody>,
    service: web::Data<Arc<ParticipantService>>,
) -> HttpResponse {
    api_result(
        service.create_participant(body.into_inner().into()).await,
        StatusCode::CREATED,
        "participant",
    )
}

pub async fn update_participant(
    path: web::Path<i32>,
    body: web::Json<ParticipantBody>,
    service: web::Data<Arc<ParticipantService>>,
) -> HttpResponse {
    api_result(
        service
            .update_participant(path.into_inner(), body.into_inner().into())
            .await,
        StatusCode::OK,
        "participant",
    )
}

pub async fn delete_participant(
    path: web::Path<i32>,
    service: web::Data<Arc<ParticipantService>>,
) -> HttpResponse {
    match service.delete_participant(path.into_inner()).await {
        Ok(()) => ok_response(),
        Err(e) => error_from_portal(&e),
    }
}
