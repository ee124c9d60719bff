//! Client route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::db;
use crate::error::Result;
use crate::models::{Client, ClientInput};
use crate::pricing::validation::validate_client;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Client>>> {
    Ok(Json(db::list_clients(&state.db).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Client>> {
    Ok(Json(db::get_client(&state.db, id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ClientInput>,
) -> Result<(StatusCode, Json<Client>)> {
    validate_client(&input)?;
    let client = db::insert_client(&state.db, &input).await?;
    tracing::info!("Created client {} ({})", client.name, client.id);
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ClientInput>,
) -> Result<Json<Client>> {
    validate_client(&input)?;
    Ok(Json(db::update_client(&state.db, id, &input).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    db::delete_client(&state.db, id).await?;
    tracing::info!("Deleted client {}", id);
    Ok(StatusCode::NO_CONTENT)
}
