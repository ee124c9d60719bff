//! Quote route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use uuid::Uuid;

use crate::db;
use crate::error::Result;
use crate::models::Quote;
use crate::pricing::requests::{CreateQuoteRequest, UpdateItemsRequest, UpdateStatusRequest};
use crate::pricing::responses::QuoteDetailResponse;
use crate::pricing::services;
use crate::AppState;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Quote>>> {
    Ok(Json(db::list_quotes(&state.db).await?))
}

/// Quote with totals recomputed from its items
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuoteDetailResponse>> {
    let quote = db::get_quote(&state.db, id).await?;
    Ok(Json(services::quote_detail(quote, &state.config.currency)))
}

pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateQuoteRequest>,
) -> Result<(StatusCode, Json<QuoteDetailResponse>)> {
    let quote =
        services::create_quote(&state.db, &state.cache, &state.vat_policy, &request).await?;
    Ok((
        StatusCode::CREATED,
        Json(services::quote_detail(quote, &state.config.currency)),
    ))
}

pub async fn update_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateItemsRequest>,
) -> Result<Json<QuoteDetailResponse>> {
    let quote =
        services::update_quote_items(&state.db, &state.cache, &state.vat_policy, id, &request)
            .await?;
    Ok(Json(services::quote_detail(quote, &state.config.currency)))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Quote>> {
    let quote = services::change_status(&state.db, &state.cache, id, request.status).await?;
    Ok(Json(quote))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    db::delete_quote(&state.db, id).await?;
    state.cache.invalidate_document(id).await;
    tracing::info!("Deleted quote {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Printable HTML rendition of a quote
pub async fn document(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Html<String>> {
    let doc = services::quote_document(&state.db, &state.cache, &state.documents, id).await?;
    Ok(Html(doc.html.clone()))
}
