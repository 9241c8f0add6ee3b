//! API 帮助函数

use actix_web::error::{InternalError, JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

use crate::errors::PortalError;

use super::error_code::ErrorCode;
use super::types::{ErrorBody, ListResponse, Pagination};

/// 请求体上限 1 MiB
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("application/json; charset=utf-8")
        .json(body)
}

/// 构建成功响应 `{ "success": true, <key>: <entity> }`
pub fn entity_response<T: Serialize>(status: StatusCode, key: &str, entity: &T) -> HttpResponse {
    match serde_json::to_value(entity) {
        Ok(value) => {
            let mut body = Map::new();
            body.insert("success".to_string(), Value::Bool(true));
            body.insert(key.to_string(), value);
            json_response(status, &Value::Object(body))
        }
        Err(e) => error_from_portal(&PortalError::from(e)),
    }
}

/// 仅 `{ "success": true }` 的响应
pub fn ok_response() -> HttpResponse {
    json_response(StatusCode::OK, &serde_json::json!({ "success": true }))
}

pub fn list_response<T: Serialize>(data: Vec<T>, pagination: Option<Pagination>) -> HttpResponse {
    json_response(
        StatusCode::OK,
        &ListResponse {
            success: true,
            data,
            pagination,
        },
    )
}

/// 构建错误响应
pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    json_response(
        status,
        &ErrorBody {
            success: false,
            error: message.to_string(),
            code,
        },
    )
}

/// 从 PortalError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
///
/// 存储层错误只记录日志，客户端收到通用消息。
pub fn error_from_portal(err: &PortalError) -> HttpResponse {
    let status = err.http_status();
    let code = ErrorCode::from(err);
    if err.is_client_visible() {
        error_response(status, code, err.message())
    } else {
        error!("{} ({}): {}", err.error_type(), err.code(), err.message());
        error_response(status, code, "Internal server error")
    }
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T: Serialize>(
    result: crate::errors::Result<T>,
    status: StatusCode,
    key: &str,
) -> HttpResponse {
    match result {
        Ok(entity) => entity_response(status, key, &entity),
        Err(e) => error_from_portal(&e),
    }
}

/// JSON 解析失败时也返回统一的错误信封
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            let response = match &err {
                JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
                    error_response(
                        StatusCode::PAYLOAD_TOO_LARGE,
                        ErrorCode::PayloadTooLarge,
                        "Request body is too large",
                    )
                }
                other => error_response(
                    StatusCode::BAD_REQUEST,
                    ErrorCode::BadRequest,
                    &format!("Invalid JSON body: {}", other),
                ),
            };
            InternalError::from_response(err, response).into()
        })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
        let response = error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &format!("Invalid query string: {}", err),
        );
        InternalError::from_response(err, response).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_json(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_rt::test]
    async fn test_entity_envelope() {
        let response = entity_response(StatusCode::CREATED, "region", &serde_json::json!({"id": 1}));
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["region"]["id"], 1);
    }

    #[actix_rt::test]
    async fn test_storage_error_is_generic() {
        let response = error_from_portal(&PortalError::database_operation("no such table: region"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Internal server error");
        assert_eq!(body["code"], 1020);
    }

    #[actix_rt::test]
    async fn test_client_error_keeps_message() {
        let response =
            error_from_portal(&PortalError::region_has_majlis("Cannot delete region with 2 dependent majlis"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Cannot delete region with 2 dependent majlis");
        assert_eq!(body["code"], 3000);
    }

    #[actix_rt::test]
    async fn test_list_without_pagination() {
        let body = body_json(list_response(vec![1, 2], None)).await;
        assert_eq!(body["data"], serde_json::json!([1, 2]));
        assert!(body.get("pagination").is_none());
    }
}
