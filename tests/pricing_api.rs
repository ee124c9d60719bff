//! Integration tests for the stateless pricing endpoints and health check.
//!
//! The database pool is created lazily and never used by these routes.

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use tradequote::cache::AppCache;
use tradequote::config::{Config, Environment};
use tradequote::{routes, AppState};

fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "postgres://localhost/tradequote_test".to_string(),
        db_max_connections: 1,
        currency: "PLN".to_string(),
        vat_rates: vec![dec!(0), dec!(5), dec!(8), dec!(23)],
        company_name: "Test Co".to_string(),
        company_details: String::new(),
        cors_origins: vec![],
        environment: Environment::Development,
    }
}

fn app() -> Router {
    let config = test_config();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("lazy pool");
    routes::router(AppState::new(pool, AppCache::new(), config))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn estimated_line() -> Value {
    json!({
        "name": "Wall painting",
        "unit": "m2",
        "net_price": "100",
        "quantity": "2",
        "vat_rate": "23",
        "material_mode": "estimated",
        "estimated_material_price": "10"
    })
}

fn detailed_line() -> Value {
    json!({
        "name": "Floor tiling",
        "unit": "m2",
        "net_price": "50",
        "quantity": "3",
        "vat_rate": "8",
        "material_mode": "detailed",
        "materials": [
            { "name": "Tiles", "price": "5", "consumption": "2" },
            { "name": "Grout", "price": "3", "consumption": "1" }
        ]
    })
}

#[tokio::test]
async fn price_single_estimated_item() {
    let (status, body) = post_json(app(), "/api/pricing/item", estimated_line()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["labor"], "200");
    assert_eq!(body["materials"], "20");
    assert_eq!(body["net"], "220");
    assert_eq!(body["vat"], "50.60");
    assert_eq!(body["gross"], "270.60");
}

#[tokio::test]
async fn price_single_detailed_item() {
    let (status, body) = post_json(app(), "/api/pricing/item", detailed_line()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["labor"], "150");
    assert_eq!(body["materials"], "39");
    assert_eq!(body["net"], "189");
    assert_eq!(body["vat"], "15.12");
    assert_eq!(body["gross"], "204.12");
}

#[tokio::test]
async fn totals_for_mixed_vat_quote() {
    let (status, body) = post_json(
        app(),
        "/api/pricing/totals",
        json!({ "items": [estimated_line(), detailed_line()] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_net"], "409");
    assert_eq!(body["labor_net"], "350");
    assert_eq!(body["materials_net"], "59");
    assert_eq!(body["total_vat"], "65.72");
    assert_eq!(body["total_gross"], "474.72");
    assert_eq!(body["currency"], "PLN");
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn totals_for_empty_quote_are_zero() {
    let (status, body) = post_json(app(), "/api/pricing/totals", json!({ "items": [] })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_net"], "0");
    assert_eq!(body["total_vat"], "0");
    assert_eq!(body["total_gross"], "0");
}

#[tokio::test]
async fn negative_quantity_is_rejected() {
    let mut line = estimated_line();
    line["quantity"] = json!("-2");

    let (status, body) = post_json(app(), "/api/pricing/totals", json!({ "items": [line] })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_type"], "validation_error");
    assert_eq!(body["details"]["field"], "items[0].quantity");
}

#[tokio::test]
async fn non_numeric_price_is_rejected() {
    let mut line = detailed_line();
    line["net_price"] = json!("fifty");

    let (status, body) = post_json(app(), "/api/pricing/item", line).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field"], "item.net_price");
}

#[tokio::test]
async fn unsupported_vat_rate_is_rejected() {
    let mut line = estimated_line();
    line["vat_rate"] = json!("19");

    let (status, body) = post_json(app(), "/api/pricing/item", line).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field"], "item.vat_rate");
}

#[tokio::test]
async fn line_too_large_to_price_is_rejected() {
    let material = json!({ "name": "Steel", "price": "1000000000", "consumption": "1000000000" });
    let mut line = detailed_line();
    line["quantity"] = json!("1000000000");
    line["vat_rate"] = json!("23");
    line["materials"] = Value::Array(vec![material; 80]);

    let (status, body) = post_json(app(), "/api/pricing/item", line).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field"], "item");
}

#[tokio::test]
async fn quote_too_large_to_price_is_rejected() {
    let mut line = estimated_line();
    line["net_price"] = json!("20000");
    line["quantity"] = json!("1000000000");
    line["estimated_material_price"] = json!("0");
    line["vat_rate"] = json!("0");

    let (status, body) = post_json(
        app(),
        "/api/pricing/totals",
        json!({ "items": vec![line; 80] }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["field"], "items");
}

#[tokio::test]
async fn health_reports_ok() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
}
