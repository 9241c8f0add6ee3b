//! 健康检查与统计端点

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, trace};

use crate::storage::SeaOrmStorage;

use super::helpers::{api_result, json_response};
use super::types::HealthResponse;

/// 数据库 ping 的超时
const PING_TIMEOUT: Duration = Duration::from_secs(5);

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// GET /health：200 healthy / 503 unhealthy
pub async fn health_check(
    storage: web::Data<Arc<SeaOrmStorage>>,
    app_start_time: web::Data<AppStartTime>,
) -> HttpResponse {
    let start_time = Instant::now();
    trace!("Received health check request");

    let database = match tokio::time::timeout(PING_TIMEOUT, storage.ping()).await {
        Ok(Ok(())) => "healthy",
        Ok(Err(e)) => {
            error!("Storage health check failed: {}", e);
            "unhealthy"
        }
        Err(_) => {
            error!("Storage health check timeout");
            "timeout"
        }
    };
    let is_healthy = database == "healthy";

    let now = chrono::Utc::now();
    let body = HealthResponse {
        status: if is_healthy { "healthy" } else { "unhealthy" },
        database,
        backend: storage.backend_name().to_string(),
        timestamp: now,
        uptime: (now - app_start_time.start_datetime).num_seconds().max(0) as u64,
        response_time_ms: start_time.elapsed().as_millis() as u64,
    };

    let status = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    json_response(
        status,
        &serde_json::json!({ "success": is_healthy, "health": body }),
    )
}

/// GET /stats
pub async fn get_stats(storage: web::Data<Arc<SeaOrmStorage>>) -> HttpResponse {
    api_result(storage.get_stats().await, StatusCode::OK, "stats")
}
