//! Service catalog route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::db;
use crate::error::Result;
use crate::models::Service;
use crate::pricing::requests::ServiceInput;
use crate::pricing::validation::parse_service;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Service>>> {
    Ok(Json(db::list_services(&state.db).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Service>> {
    let service = state.cache.service(&state.db, id).await?;
    Ok(Json((*service).clone()))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ServiceInput>,
) -> Result<(StatusCode, Json<Service>)> {
    let fields = parse_service(&input, &state.vat_policy)?;
    let service = db::insert_service(&state.db, &fields).await?;
    state.cache.store_service(service.clone()).await;

    tracing::info!("Created catalog service {} ({})", service.name, service.id);
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ServiceInput>,
) -> Result<Json<Service>> {
    let fields = parse_service(&input, &state.vat_policy)?;
    let service = db::update_service(&state.db, id, &fields).await?;
    state.cache.store_service(service.clone()).await;
    Ok(Json(service))
}

/// Remove a service. Existing quote lines keep their copied pricing.
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    db::delete_service(&state.db, id).await?;
    state.cache.invalidate_service(id).await;
    Ok(StatusCode::NO_CONTENT)
}
