//! HTTP routes

pub mod catalog;
pub mod clients;
pub mod quotes;
pub mod shopping_lists;

use axum::{
    extract::State,
    http::HeaderValue,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::cache::CacheStats;
use crate::config::Config;
use crate::pricing;
use crate::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    let api = Router::new()
        .nest("/pricing", pricing::router())
        .route("/clients", get(clients::list).post(clients::create))
        .route(
            "/clients/:id",
            get(clients::get)
                .put(clients::update)
                .delete(clients::delete),
        )
        .route("/services", get(catalog::list).post(catalog::create))
        .route(
            "/services/:id",
            get(catalog::get)
                .put(catalog::update)
                .delete(catalog::delete),
        )
        .route("/quotes", get(quotes::list).post(quotes::create))
        .route("/quotes/:id", get(quotes::get).delete(quotes::delete))
        .route("/quotes/:id/items", put(quotes::update_items))
        .route("/quotes/:id/status", put(quotes::update_status))
        .route(
            "/quotes/:id/shopping-list",
            post(shopping_lists::create_from_quote),
        )
        .route("/shopping-lists", get(shopping_lists::list))
        .route(
            "/shopping-lists/:id",
            get(shopping_lists::get).delete(shopping_lists::delete),
        )
        .route(
            "/shopping-lists/:id/entries/:index",
            put(shopping_lists::toggle_entry),
        );

    Router::new()
        .route("/health", get(health))
        .route("/quotes/:id/document", get(quotes::document))
        .nest("/api", api)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.is_production() {
        CorsLayer::new()
            .allow_origin(
                config
                    .cors_origins
                    .iter()
                    .filter_map(|o| o.parse::<HeaderValue>().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    cache: CacheStats,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        cache: state.cache.stats(),
    })
}
