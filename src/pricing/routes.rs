//! Stateless pricing endpoints used by the quote editor for live totals.

use axum::{extract::State, routing::post, Json, Router};

use crate::error::Result;
use crate::AppState;

use super::calculators::{
    calculate_item_labor, calculate_item_materials, calculate_item_total, quote_breakdown,
};
use super::requests::{CalculateTotalsRequest, QuoteItemInput};
use super::responses::{ItemTotalResponse, QuoteTotalsResponse};
use super::validation::{parse_item, parse_items};

/// Pricing API router, mounted under `/api/pricing`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/item", post(calculate_item))
        .route("/totals", post(calculate_totals))
}

/// Price a single line as currently typed
async fn calculate_item(
    State(state): State<AppState>,
    Json(input): Json<QuoteItemInput>,
) -> Result<Json<ItemTotalResponse>> {
    let item = parse_item("item", &input, &state.vat_policy)?;

    Ok(Json(ItemTotalResponse {
        labor: calculate_item_labor(&item),
        materials: calculate_item_materials(&item),
        total: calculate_item_total(&item),
    }))
}

/// Price a full set of lines and aggregate them
async fn calculate_totals(
    State(state): State<AppState>,
    Json(request): Json<CalculateTotalsRequest>,
) -> Result<Json<QuoteTotalsResponse>> {
    let items = parse_items(&request.items, &state.vat_policy)?;
    let (rows, totals) = quote_breakdown(&items);

    tracing::debug!(
        "Priced {} items: net {} vat {}",
        items.len(),
        totals.total_net,
        totals.total_vat
    );

    Ok(Json(QuoteTotalsResponse::new(
        rows,
        totals,
        &state.config.currency,
    )))
}
