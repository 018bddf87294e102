//! Tests for the `GET /api` endpoint listing.

mod common;

use axum::http::StatusCode;
use common::{body_json, get};

#[tokio::test]
async fn listing_names_the_service_and_its_endpoints() {
    let app = common::build_offline_app();
    let response = get(app, "/api").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["name"], "conjunto-api");
    assert!(json["version"].is_string());

    let endpoints: Vec<&str> = json["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap())
        .collect();
    for expected in [
        "GET /health",
        "POST /api/v1/auth/login",
        "POST /api/v1/pqrs/{id}/status",
        "GET /api/v1/reservations/quote",
        "POST /api/v1/admin/bulk-delete",
    ] {
        assert!(endpoints.contains(&expected), "missing {expected}");
    }
}

#[tokio::test]
async fn listed_endpoints_are_unique() {
    let endpoints = conjunto_api::routes::ENDPOINTS;
    let mut sorted = endpoints.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), endpoints.len());
}
