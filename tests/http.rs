mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::*;
use keydepot::handlers;
use keydepot::models::FulfillmentState;

const AMZ: &str = "408-1234567-1234567";
const CODE: &str = "12345678901234";

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, None, Some(body)).await
}

#[tokio::test]
async fn health_reports_ok() {
    let (pool, _dir) = file_pool(2);
    let app = handlers::router(test_state(pool));

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn verify_then_redeem_round_trip() {
    let (pool, _dir) = file_pool(2);
    {
        let conn = pool.get().unwrap();
        website_order(&conn, CODE, "WIN11HOME", 1);
        seed_keys(&conn, "WIN11HOME", 3);
        seed_product(&conn, "WIN11HOME", "Windows 11 Home");
    }
    let app = handlers::router(test_state(pool));

    let (status, body) = post(&app, "/activate/verify", json!({ "order_id": CODE })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["already_redeemed"], false);
    assert_eq!(body["components"], json!(["WIN11HOME"]));
    assert_eq!(body["product_name"], "Windows 11 Home");

    let (status, body) = post(&app, "/activate/redeem", json!({ "order_id": CODE })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["already_redeemed"], false);
    assert_eq!(body["keys"].as_array().unwrap().len(), 1);
    let key = body["keys"][0]["key"].as_str().unwrap().to_string();

    // Replay over HTTP returns the same key, flagged as already redeemed.
    let (status, body) = post(&app, "/activate/redeem", json!({ "order_id": CODE })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["already_redeemed"], true);
    assert_eq!(body["keys"][0]["key"], key);
}

#[tokio::test]
async fn malformed_identifier_is_400() {
    let (pool, _dir) = file_pool(2);
    let app = handlers::router(test_state(pool));

    let (status, body) =
        post(&app, "/activate/redeem", json!({ "order_id": "garbage" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid format"));
}

#[tokio::test]
async fn unknown_order_is_404() {
    let (pool, _dir) = file_pool(2);
    let app = handlers::router(test_state(pool));

    let (status, _) = post(&app, "/activate/redeem", json!({ "order_id": AMZ })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn refunded_order_is_403_with_structured_denial() {
    let (pool, _dir) = file_pool(2);
    {
        let conn = pool.get().unwrap();
        website_order(&conn, CODE, "WIN11HOME", 1);
        keydepot::db::queries::set_order_refunded(&conn, CODE, true).unwrap();
    }
    let app = handlers::router(test_state(pool));

    let (status, body) = post(&app, "/activate/redeem", json!({ "order_id": CODE })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "REFUNDED");
    assert_eq!(body["can_appeal"], false);
}

#[tokio::test]
async fn too_early_fba_denial_carries_retry_fields() {
    let (pool, _dir) = file_pool(2);
    {
        let conn = pool.get().unwrap();
        set_delay(&conn, "DEFAULT", 7 * 24);
        fba_order(&conn, AMZ, "WIN11HOME", 1, 2, Some(FulfillmentState::Shipped));
    }
    let app = handlers::router(test_state(pool));

    let (status, body) = post(&app, "/activate/redeem", json!({ "order_id": AMZ })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "TOO_EARLY");
    assert!(body["retry_at"].is_i64());
    assert_eq!(body["days_remaining"], 5);
    assert_eq!(body["can_appeal"], true);
}

#[tokio::test]
async fn exhausted_pool_is_503_and_retryable() {
    let (pool, _dir) = file_pool(2);
    {
        let conn = pool.get().unwrap();
        website_order(&conn, CODE, "WIN11HOME", 2);
        seed_keys(&conn, "WIN11HOME", 1);
    }
    let app = handlers::router(test_state(pool));

    let (status, body) = post(&app, "/activate/redeem", json!({ "order_id": CODE })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["retryable"], true);
    // The shortfall must not have bound the one remaining key.
    let (status, body) = post(&app, "/activate/verify", json!({ "order_id": CODE })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["already_redeemed"], false);
}

#[tokio::test]
async fn appeal_submission_requires_contact_details() {
    let (pool, _dir) = file_pool(2);
    let app = handlers::router(test_state(pool));

    let (status, _) = post(
        &app,
        "/activate/appeal",
        json!({ "order_id": AMZ, "email": "", "whatsapp": "", "proof_reference": "p" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn appeal_review_flow_over_http() {
    let (pool, _dir) = file_pool(2);
    {
        let conn = pool.get().unwrap();
        set_delay(&conn, "DEFAULT", 7 * 24);
        fba_order(&conn, AMZ, "WIN11HOME", 1, 2, Some(FulfillmentState::Shipped));
        seed_keys(&conn, "WIN11HOME", 2);
    }
    let app = handlers::router(test_state(pool));

    let (status, body) = post(
        &app,
        "/activate/appeal",
        json!({
            "order_id": AMZ,
            "email": "customer@example.com",
            "whatsapp": "+911234567890",
            "proof_reference": "upload-42",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    let appeal_id = body["appeal_id"].as_str().unwrap().to_string();

    // Duplicate submission while pending.
    let (status, _) = post(
        &app,
        "/activate/appeal",
        json!({
            "order_id": AMZ,
            "email": "customer@example.com",
            "whatsapp": "+911234567890",
            "proof_reference": "upload-43",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::GET,
        "/admin/appeals?status=pending",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], appeal_id.as_str());
    assert_eq!(body["items"][0]["order"]["fulfillment_type"], "amazon_fba");

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/admin/appeals/{appeal_id}"),
        Some(ADMIN_TOKEN),
        Some(json!({ "action": "approve", "admin_notes": "proof verified" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "approved");

    // Approval unlocks redemption inside the delay window.
    let (status, body) = post(&app, "/activate/redeem", json!({ "order_id": AMZ })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["keys"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn feedback_appeal_flow_over_http() {
    let (pool, _dir) = file_pool(2);
    {
        let conn = pool.get().unwrap();
        website_order(&conn, CODE, "WIN11HOME", 1);
        seed_keys(&conn, "WIN11HOME", 2);
        keydepot::db::queries::set_order_block_status(
            &conn,
            CODE,
            keydepot::models::BlockStatus::Blocked,
        )
        .unwrap();
    }
    let app = handlers::router(test_state(pool));

    let (status, body) = post(&app, "/activate/redeem", json!({ "order_id": CODE })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["reason"], "BLOCKED");
    assert_eq!(body["can_appeal"], true);

    let (status, body) = post(
        &app,
        "/activate/feedback-appeal",
        json!({
            "order_id": CODE,
            "email": "customer@example.com",
            "whatsapp": "+911234567890",
            "proof_reference": "removal-screenshot-7",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    let appeal_id = body["appeal_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/admin/appeals/{appeal_id}"),
        Some(ADMIN_TOKEN),
        Some(json!({ "action": "approve" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["appeal_type"], "feedback_removal");

    let (status, body) = post(&app, "/activate/redeem", json!({ "order_id": CODE })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["keys"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn admin_routes_are_hidden_without_a_configured_token() {
    let (pool, _dir) = file_pool(2);
    let mut state = test_state(pool);
    state.admin_token = None;
    let app = handlers::router(state);

    let (status, _) = send(&app, Method::GET, "/admin/appeals", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_enforce_the_bearer_token() {
    let (pool, _dir) = file_pool(2);
    let app = handlers::router(test_state(pool));

    let (status, _) = send(&app, Method::GET, "/admin/appeals", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) =
        send(&app, Method::GET, "/admin/appeals", Some("wrong-token"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) =
        send(&app, Method::GET, "/admin/appeals", Some(ADMIN_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn state_delays_round_trip_through_the_admin_api() {
    let (pool, _dir) = file_pool(2);
    let app = handlers::router(test_state(pool));

    let (status, body) = send(
        &app,
        Method::PUT,
        "/admin/state-delays",
        Some(ADMIN_TOKEN),
        Some(json!({ "state_name": "kerala", "delay_hours": 24 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state_name"], "KERALA");

    let (status, _) = send(
        &app,
        Method::PUT,
        "/admin/state-delays",
        Some(ADMIN_TOKEN),
        Some(json!({ "state_name": "goa", "delay_hours": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::GET,
        "/admin/state-delays",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "state_name": "KERALA", "delay_hours": 24 }]));

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/admin/state-delays/kerala",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/admin/state-delays/kerala",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::GET,
        "/admin/state-delays",
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}
