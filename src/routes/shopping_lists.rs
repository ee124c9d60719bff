//! Shopping list route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::db;
use crate::error::Result;
use crate::pricing::requests::CreateShoppingListRequest;
use crate::pricing::responses::ShoppingListResponse;
use crate::pricing::services;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ShoppingListResponse>>> {
    let lists = db::list_shopping_lists(&state.db).await?;
    Ok(Json(
        lists
            .into_iter()
            .map(|list| ShoppingListResponse::new(list, &state.config.currency))
            .collect(),
    ))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShoppingListResponse>> {
    let list = db::get_shopping_list(&state.db, id).await?;
    Ok(Json(ShoppingListResponse::new(list, &state.config.currency)))
}

/// Derive a shopping list from a quote's itemized materials
pub async fn create_from_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<Uuid>,
    body: Option<Json<CreateShoppingListRequest>>,
) -> Result<(StatusCode, Json<ShoppingListResponse>)> {
    let name = body.and_then(|Json(request)| request.name);
    let list = services::generate_shopping_list(&state.db, quote_id, name.as_deref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ShoppingListResponse::new(list, &state.config.currency)),
    ))
}

pub async fn toggle_entry(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<ShoppingListResponse>> {
    let list = services::toggle_shopping_entry(&state.db, id, index).await?;
    Ok(Json(ShoppingListResponse::new(list, &state.config.currency)))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    db::delete_shopping_list(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
