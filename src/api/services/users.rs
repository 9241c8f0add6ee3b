//! 子账户管理与子账户登录端点

use actix_governor::{Governor, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError};
use actix_web::dev::ServiceRequest;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::services::UserService;

use super::helpers::{api_result, error_from_portal, list_response, ok_response};
use super::types::{CreateUserBody, LoginCredentials, UpdateUserBody, UserResponse};

/// 登录限流：每秒补充 1 个令牌，突发 5 次
const LOGIN_PER_SECOND: u64 = 1;
const LOGIN_BURST: u32 = 5;

/// 按客户端地址限流；取不到地址时归入同一个桶
#[derive(Clone, Copy)]
pub struct LoginKeyExtractor;

impl KeyExtractor for LoginKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> Result<Self::Key, Self::KeyExtractionError> {
        let conn_info = req.connection_info();
        let key = conn_info
            .peer_addr()
            .or_else(|| conn_info.realip_remote_addr())
            .unwrap_or("unknown")
            .to_string();
        Ok(key)
    }
}

/// 创建子账户登录限流器，超限返回 429
pub fn login_rate_limiter() -> Option<Governor<LoginKeyExtractor, NoOpMiddleware>> {
    let config = GovernorConfigBuilder::default()
        .seconds_per_request(LOGIN_PER_SECOND)
        .burst_size(LOGIN_BURST)
        .key_extractor(LoginKeyExtractor)
        .finish();

    match config {
        Some(config) => {
            debug!(
                "Login rate limiter created: 1 req/{}s, burst {}",
                LOGIN_PER_SECOND, LOGIN_BURST
            );
            Some(Governor::new(&config))
        }
        None => {
            warn!("Invalid login rate limit config, limiter disabled");
            None
        }
    }
}

pub async fn list_users(service: web::Data<Arc<UserService>>) -> HttpResponse {
    match service.list_users().await {
        Ok(users) => list_response(
            users.into_iter().map(UserResponse::from).collect(),
            None,
        ),
        Err(e) => error_from_portal(&e),
    }
}

pub async fn create_user(
    body: web::Json<CreateUserBody>,
    service: web::Data<Arc<UserService>>,
) -> HttpResponse {
    api_result(
        service
            .create_user(body.into_inner().into())
            .await
            .map(UserResponse::from),
        StatusCode::CREATED,
        "user",
    )
}

pub async fn update_user(
    path: web::Path<i32>,
    body: web::Json<UpdateUserBody>,
    service: web::Data<Arc<UserService>>,
) -> HttpResponse {
    api_result(
        service
            .update_user(path.into_inner(), body.into_inner().into())
            .await
            .map(UserResponse::from),
        StatusCode::OK,
        "user",
    )
}

pub async fn delete_user(
    path: web::Path<i32>,
    service: web::Data<Arc<UserService>>,
) -> HttpResponse {
    match service.delete_user(path.into_inner()).await {
        Ok(()) => ok_response(),
        Err(e) => error_from_portal(&e),
    }
}

/// POST /auth/sub-login
pub async fn sub_login(
    body: web::Json<LoginCredentials>,
    service: web::Data<Arc<UserService>>,
) -> HttpResponse {
    let body = body.into_inner();
    api_result(
        service
            .authenticate(&body.username, &body.password)
            .await
            .map(UserResponse::from),
        StatusCode::OK,
        "user",
    )
}
