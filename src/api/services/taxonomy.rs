//! Region / majlis 端点

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use std::sync::Arc;
use tracing::info;

use crate::services::{MajlisService, RegionService, UpdateTaxonomyRequest};

use super::helpers::{api_result, error_from_portal, list_response, ok_response};
use super::types::{CreateMajlisRequest, CreateRegionRequest, MajlisQuery, UpdateTaxonomyBody};

impl From<UpdateTaxonomyBody> for UpdateTaxonomyRequest {
    fn from(body: UpdateTaxonomyBody) -> Self {
        Self {
            name: body.name,
            code: body.code,
            region_id: body.region_id,
        }
    }
}

pub async fn list_regions(service: web::Data<Arc<RegionService>>) -> HttpResponse {
    match service.list_regions().await {
        Ok(regions) => list_response(regions, None),
        Err(e) => error_from_portal(&e),
    }
}

pub async fn get_region(
    path: web::Path<i32>,
    service: web::Data<Arc<RegionService>>,
) -> HttpResponse {
    api_result(
        service.get_region(path.into_inner()).await,
        StatusCode::OK,
        "region",
    )
}

pub async fn create_region(
    body: web::Json<CreateRegionRequest>,
    service: web::Data<Arc<RegionService>>,
) -> HttpResponse {
    let body = body.into_inner();
    let result = service.create_region(&body.name, body.code.as_deref()).await;
    if let Ok(region) = &result {
        info!("API: region created {} ({})", region.name, region.code);
    }
    api_result(result, StatusCode::CREATED, "region")
}

pub async fn update_region(
    path: web::Path<i32>,
    body: web::Json<UpdateTaxonomyBody>,
    service: web::Data<Arc<RegionService>>,
) -> HttpResponse {
    api_result(
        service
            .update_region(path.into_inner(), body.into_inner().into())
            .await,
        StatusCode::OK,
        "region",
    )
}

pub async fn delete_region(
    path: web::Path<i32>,
    service: web::Data<Arc<RegionService>>,
) -> HttpResponse {
    match service.delete_region(path.into_inner()).await {
        Ok(()) => ok_response(),
        Err(e) => error_from_portal(&e),
    }
}

pub async fn list_majlis(
    query: web::Query<MajlisQuery>,
    service: web::Data<Arc<MajlisService>>,
) -> HttpResponse {
    match service.list_majlis(query.region_id).await {
        Ok(majlis) => list_response(majlis, None),
        Err(e) => error_from_portal(&e),
    }
}

pub async fn get_majlis(
    path: web::Path<i32>,
    service: web::Data<Arc<MajlisService>>,
) -> HttpResponse {
    api_result(
        service.get_majlis(path.into_inner()).await,
        StatusCode::OK,
        "majlis",
    )
}

pub async fn create_majlis(
    body: web::Json<CreateMajlisRequest>,
    service: web::Data<Arc<MajlisService>>,
) -> HttpResponse {
    let body = body.into_inner();
    api_result(
        service
            .create_majlis(&body.name, body.code.as_deref(), body.region_id)
            .await,
        StatusCode::CREATED,
        "majlis",
    )
}

pub async fn update_majlis(
    path: web::Path<i32>,
    body: web::Json<UpdateTaxonomyBody>,
    service: web::Data<Arc<MajlisService>>,
) -> HttpResponse {
    api_result(
        service
            .update_majlis(path.into_inner(), body.into_inner().into())
            .await,
        StatusCode::OK,
        "majlis",
    )
}

/// 删除 majlis，响应中带回被解除关联的参与者数量
pub async fn delete_majlis(
    path: web::Path<i32>,
    service: web::Data<Arc<MajlisService>>,
) -> HttpResponse {
    match service.delete_majlis(path.into_inner()).await {
        Ok(detached) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "detachedParticipants": detached,
        })),
        Err(e) => error_from_portal(&e),
    }
}
