//! Request validation that happens before any database access.
//!
//! All tests here run against an app whose pool never connects, so each
//! request must be settled by extractors, field validation or domain rules.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{body_json, get_auth, post_json_auth};
use serde_json::json;
use tower::ServiceExt;

const ADMIN_ID: i64 = 1;

// ---------------------------------------------------------------------------
// Body parsing and field validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn malformed_json_is_rejected() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();

    let response = common::build_offline_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_required_field_is_unprocessable() {
    let token = common::admin_token(ADMIN_ID);
    let body = json!({ "name": "Torre A" });

    let response =
        post_json_auth(common::build_offline_app(), "/api/v1/towers", body, &token).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn tower_needs_at_least_one_floor() {
    let token = common::admin_token(ADMIN_ID);
    let body = json!({ "name": "Torre A", "floors": 0 });

    let response =
        post_json_auth(common::build_offline_app(), "/api/v1/towers", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Invalid fields: floors");
}

#[tokio::test]
async fn parking_spot_cannot_be_created_as_assigned() {
    let token = common::admin_token(ADMIN_ID);
    let body = json!({ "code": "S1-014", "kind": "car", "status": "assigned" });

    let response =
        post_json_auth(common::build_offline_app(), "/api/v1/parking", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pqrs_with_unknown_kind_is_rejected() {
    let token = common::resident_token(7);
    let body = json!({
        "kind": "praise",
        "category": "noise",
        "subject": "Ruido nocturno",
        "description": "Música a alto volumen después de las 11pm",
    });

    let response = post_json_auth(common::build_offline_app(), "/api/v1/pqrs", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("kind"));
}

#[tokio::test]
async fn pqrs_description_has_a_minimum_length() {
    let token = common::resident_token(7);
    let body = json!({
        "kind": "complaint",
        "category": "noise",
        "subject": "Ruido",
        "description": "Ruido",
    });

    let response = post_json_auth(common::build_offline_app(), "/api/v1/pqrs", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid fields: description");
}

#[tokio::test]
async fn notification_target_must_name_its_recipient() {
    let token = common::admin_token(ADMIN_ID);
    let body = json!({
        "target": "tower",
        "title": "Corte de agua",
        "message": "Mañana de 8am a 12m",
        "kind": "maintenance",
    });

    let response = post_json_auth(
        common::build_offline_app(),
        "/api/v1/notifications",
        body,
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "target 'tower' requires tower_id");
}

#[tokio::test]
async fn payment_discount_cannot_exceed_subtotal() {
    let token = common::admin_token(ADMIN_ID);
    let body = json!({
        "apartment_id": 1,
        "concept": "administration",
        "period": "2026-11",
        "items": [{ "description": "Cuota de administración", "amount": 350000 }],
        "discount": 400000,
        "due_date": "2026-11-10",
    });

    let response =
        post_json_auth(common::build_offline_app(), "/api/v1/payments", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn payment_subtotal_is_capped() {
    let token = common::admin_token(ADMIN_ID);
    let body = json!({
        "apartment_id": 1,
        "concept": "extraordinary",
        "period": "2026-11",
        "items": [{ "description": "Obra de fachada", "amount": 100_000_000_000_000_000_i64 }],
        "due_date": "2026-11-10",
    });

    let response =
        post_json_auth(common::build_offline_app(), "/api/v1/payments", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        "Payment subtotal cannot exceed 1000000000000"
    );
}

#[tokio::test]
async fn payment_period_must_be_year_and_month() {
    let token = common::admin_token(ADMIN_ID);
    let body = json!({
        "apartment_id": 1,
        "concept": "administration",
        "period": "2026-13",
        "items": [{ "description": "Cuota de administración", "amount": 350000 }],
        "due_date": "2026-11-10",
    });

    let response =
        post_json_auth(common::build_offline_app(), "/api/v1/payments", body, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid period '2026-13'. Expected YYYY-MM");
}

// ---------------------------------------------------------------------------
// Reservation quotes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn quote_prices_a_social_hall_evening() {
    let token = common::resident_token(7);
    let uri = "/api/v1/reservations/quote?area=social_hall&date=2099-01-10\
               &start_time=18:00:00&end_time=22:00:00&guests=40";

    let response = get_auth(common::build_offline_app(), uri, &token).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["duration_minutes"], 240);
    assert_eq!(json["data"]["cost"], 100_000);
    assert_eq!(json["data"]["deposit"], 200_000);
}

#[tokio::test]
async fn quote_rejects_bookings_outside_opening_hours() {
    let token = common::resident_token(7);
    let uri = "/api/v1/reservations/quote?area=pool&date=2099-01-10\
               &start_time=05:00:00&end_time=07:00:00&guests=2";

    let response = get_auth(common::build_offline_app(), uri, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "pool is open from 07:00 to 20:00");
}

#[tokio::test]
async fn quote_rejects_past_dates() {
    let token = common::resident_token(7);
    let uri = "/api/v1/reservations/quote?area=bbq&date=2020-01-10\
               &start_time=12:00:00&end_time=14:00:00&guests=5";

    let response = get_auth(common::build_offline_app(), uri, &token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Bulk delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bulk_delete_rejects_unknown_entities() {
    let token = common::admin_token(ADMIN_ID);
    let body = json!({ "entity": "roles", "ids": [3] });

    let response = post_json_auth(
        common::build_offline_app(),
        "/api/v1/admin/bulk-delete",
        body,
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().starts_with("Unknown entity 'roles'"));
}

#[tokio::test]
async fn bulk_delete_needs_ids() {
    let token = common::admin_token(ADMIN_ID);
    let body = json!({ "entity": "towers", "ids": [] });

    let response = post_json_auth(
        common::build_offline_app(),
        "/api/v1/admin/bulk-delete",
        body,
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_cannot_bulk_delete_own_account() {
    let token = common::admin_token(ADMIN_ID);
    let body = json!({ "entity": "users", "ids": [4, ADMIN_ID] });

    let response = post_json_auth(
        common::build_offline_app(),
        "/api/v1/admin/bulk-delete",
        body,
        &token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}
