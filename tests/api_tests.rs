//! HTTP API 集成测试：路由、信封格式与状态码

mod common;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test};
use serde_json::{Value, json};

use majlis_portal::api::services::{AppStartTime, configure};

fn started() -> AppStartTime {
    AppStartTime {
        start_datetime: chrono::Utc::now(),
    }
}

macro_rules! init_app {
    ($env:expr) => {{
        let started = started();
        test::init_service(
            App::new().configure(|cfg| configure(cfg, &$env.services, &started)),
        )
        .await
    }};
}

#[actix_rt::test]
async fn test_region_create_and_dependent_delete() {
    let env = common::setup().await;
    let app = init_app!(env);

    let req = test::TestRequest::post()
        .uri("/regions")
        .set_json(json!({"name": "Nairobi"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["region"]["code"], "NAI");
    let region_id = body["region"]["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/regions")
        .set_json(json!({"name": "Nairobi"}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["region"]["code"], "NAI1");

    let req = test::TestRequest::post()
        .uri("/majlis")
        .set_json(json!({"name": "Eastleigh", "regionId": region_id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::delete()
        .uri(&format!("/regions/{}", region_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 3000);

    let req = test::TestRequest::get()
        .uri(&format!("/majlis?regionId={}", region_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_missing_entity_is_404() {
    let env = common::setup().await;
    let app = init_app!(env);

    let req = test::TestRequest::get().uri("/participants/404").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 1004);
}

#[actix_rt::test]
async fn test_invalid_json_uses_error_envelope() {
    let env = common::setup().await;
    let app = init_app!(env);

    let req = test::TestRequest::post()
        .uri("/regions")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 1000);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON body"));
}

#[actix_rt::test]
async fn test_user_lifecycle_and_sub_login() {
    let env = common::setup().await;
    let app = init_app!(env);

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({
            "name": "Amina",
            "role": "regional",
            "username": "amina",
            "password": "s3cret-pass"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user"]["role"], "regional");
    assert!(body["user"].get("passwordHash").is_none());

    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(json!({"name": "Dup", "username": "amina", "password": "x"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/auth/sub-login")
        .set_json(json!({"username": "amina", "password": "s3cret-pass"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], "amina");
    assert!(body["user"].get("passwordHash").is_none());

    let req = test::TestRequest::post()
        .uri("/auth/sub-login")
        .set_json(json!({"username": "amina", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 2000);
    assert_eq!(body["error"], "Invalid username or password");
}

#[actix_rt::test]
async fn test_attendance_and_participant_pagination() {
    let env = common::setup().await;
    let app = init_app!(env);

    let mut participant_id = 0;
    for name in ["Amir", "Bilal", "Chaudhry"] {
        let req = test::TestRequest::post()
            .uri("/participants")
            .set_json(json!({"name": name, "category": "khuddam"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        participant_id = body["participant"]["id"].as_i64().unwrap();
    }

    let req = test::TestRequest::get()
        .uri("/participants?page=1&pageSize=2")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["totalPages"], 2);

    let req = test::TestRequest::get()
        .uri("/participants?category=unknown")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/event-attendance")
        .set_json(json!({"participantId": participant_id}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/event-attendance").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["event"]["name"], "General Attendance");
    assert_eq!(body["event"]["isActive"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["present"], true);

    let req = test::TestRequest::post()
        .uri("/event-attendance")
        .set_json(json!({"present": true}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_participant_paging_bounds_and_literal_search() {
    let env = common::setup().await;
    let app = init_app!(env);

    for name in ["Amir_Khan", "Bilal", "Chaudhry"] {
        let req = test::TestRequest::post()
            .uri("/participants")
            .set_json(json!({"name": name}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    // 超大页码被截断，返回空页而不是失败
    let req = test::TestRequest::get()
        .uri("/participants?page=18446744073709551615&pageSize=100")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["page"], u32::MAX as u64);
    assert_eq!(body["pagination"]["total"], 3);

    // `_` 与 `%` 按字面匹配
    let req = test::TestRequest::get()
        .uri("/participants?search=_")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Amir_Khan");

    let req = test::TestRequest::get()
        .uri("/participants?search=%25")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_out_of_range_page_is_rejected_by_storage() {
    let env = common::setup().await;
    let err = env
        .services
        .storage
        .list_participants(u64::MAX, 100, &Default::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        majlis_portal::errors::PortalError::Validation(_)
    ));
}

#[actix_rt::test]
async fn test_report_export_download() {
    let env = common::setup().await;
    let region = env.region("Nairobi").await;
    let majlis = env.majlis("Eastleigh", region.id).await;
    let app = init_app!(env);

    let req = test::TestRequest::post()
        .uri("/report-data")
        .set_json(json!({
            "regionId": region.id,
            "majlisId": majlis.id,
            "reportMonth": 3,
            "reportYear": 2024,
            "section": "maal",
            "amountCollected": 420.5
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/report-data")
        .set_json(json!({"regionId": region.id, "reportMonth": 3}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "majlisId is required");

    let req = test::TestRequest::get()
        .uri("/report-data/export?section=maal&year=2024&month=3")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let content_type = resp
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("report-maal-2024-03.csv"));

    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("normalized,Nairobi,Eastleigh,2024,3,maal"));
    assert!(text.contains("420.5"));
}

#[actix_rt::test]
async fn test_health_and_stats() {
    let env = common::setup().await;
    env.region("Nairobi").await;
    let app = init_app!(env);

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["health"]["status"], "healthy");
    assert_eq!(body["health"]["database"], "healthy");

    let req = test::TestRequest::get().uri("/stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["stats"]["regions"], 1);
    assert_eq!(body["stats"]["participants"], 0);
}
