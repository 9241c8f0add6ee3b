//! 报告端点与 CSV 导出

use actix_web::http::StatusCode;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, web};
use std::sync::Arc;
use tracing::info;

use crate::services::{ExportQuery, ReportService};

use super::helpers::{api_result, error_from_portal, list_response};
use super::types::{LegacyReportRequest, ReportQuery, ReportUpsertRequest};

pub async fn list_reports(
    query: web::Query<ReportQuery>,
    service: web::Data<Arc<ReportService>>,
) -> HttpResponse {
    match service.list_reports(query.into_inner().into()).await {
        Ok(rows) => list_response(rows, None),
        Err(e) => error_from_portal(&e),
    }
}

pub async fn upsert_report(
    body: web::Json<ReportUpsertRequest>,
    service: web::Data<Arc<ReportService>>,
) -> HttpResponse {
    let body = body.into_inner();
    let result = match body.key.into_key() {
        Ok(key) => service.upsert_report(key, body.fields).await,
        Err(e) => Err(e),
    };
    api_result(result, StatusCode::OK, "report")
}

/// GET /report-data/export：生成 CSV 附件
pub async fn export_reports(
    query: web::Query<ReportQuery>,
    service: web::Data<Arc<ReportService>>,
) -> HttpResponse {
    let query = query.into_inner();
    info!("API: report export requested: {:?}", query);

    let export = match service
        .export(ExportQuery {
            section: query.section,
            year: query.year,
            month: query.month,
            region_id: query.region_id,
            majlis_id: query.majlis_id,
        })
        .await
    {
        Ok(export) => export,
        Err(e) => return error_from_portal(&e),
    };

    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(export.filename)],
        })
        .body(export.content)
}

pub async fn list_legacy_reports(
    query: web::Query<ReportQuery>,
    service: web::Data<Arc<ReportService>>,
) -> HttpResponse {
    match service.list_legacy_reports(query.into_inner().into()).await {
        Ok(rows) => list_response(rows, None),
        Err(e) => error_from_portal(&e),
    }
}

pub async fn upsert_legacy_report(
    body: web::Json<LegacyReportRequest>,
    service: web::Data<Arc<ReportService>>,
) -> HttpResponse {
    let body = body.into_inner();
    let result = match body.key.into_key() {
        Ok(key) => service.upsert_legacy_report(key, body.details).await,
        Err(e) => Err(e),
    };
    api_result(result, StatusCode::OK, "report")
}
