//! Quote workflows with database access.
//!
//! Every path that changes a quote's items recomputes totals and persists
//! both in a single write. Reads that present totals recompute them from the
//! items and flag any drift from the cached columns.

use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{AppCache, RenderedDocument};
use crate::db;
use crate::document::{render_quote_document, DocumentSettings};
use crate::error::{AppError, Result};
use crate::models::{ClientSnapshot, Quote, QuoteItem, QuoteStatus, ShoppingList};

use super::calculators::{get_quote_totals, quote_breakdown};
use super::materials::shopping_entries;
use super::requests::{CatalogLineInput, CreateQuoteRequest, UpdateItemsRequest};
use super::responses::{QuoteDetailResponse, QuoteTotalsResponse};
use super::validation::{
    check_quote_total, parse_amount, parse_items, validate_item, ValidationError, VatPolicy,
};

/// Resolve the client data to copy into a new quote
async fn resolve_client(pool: &PgPool, request: &CreateQuoteRequest) -> Result<ClientSnapshot> {
    let snapshot = match request.client_id {
        Some(client_id) => db::get_client(pool, client_id).await?.snapshot(),
        None => request.client.clone().unwrap_or_default(),
    };

    if snapshot.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "client.name".to_string(),
        }
        .into());
    }
    Ok(snapshot)
}

/// Build lines from catalog references, copying each service's pricing
async fn catalog_lines(
    pool: &PgPool,
    cache: &AppCache,
    policy: &VatPolicy,
    lines: &[CatalogLineInput],
    offset: usize,
) -> Result<Vec<QuoteItem>> {
    let mut items = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        let prefix = format!("items[{}]", offset + i);
        let quantity_field = format!("{}.quantity", prefix);
        let quantity = parse_amount(&quantity_field, &line.quantity)?
            .ok_or(ValidationError::Required {
                field: quantity_field,
            })?;

        let service = cache.service(pool, line.service_id).await?;
        let item = QuoteItem::from_service(&service, quantity);
        validate_item(&prefix, &item, policy)?;
        items.push(item);
    }

    Ok(items)
}

/// Create a draft quote with computed totals
pub async fn create_quote(
    pool: &PgPool,
    cache: &AppCache,
    policy: &VatPolicy,
    request: &CreateQuoteRequest,
) -> Result<Quote> {
    let client = resolve_client(pool, request).await?;

    let mut items = parse_items(&request.items, policy)?;
    let from_catalog =
        catalog_lines(pool, cache, policy, &request.catalog_items, items.len()).await?;
    items.extend(from_catalog);
    check_quote_total(&items)?;

    let totals = get_quote_totals(&items);
    let issue_date = request
        .issue_date
        .unwrap_or_else(|| Utc::now().date_naive());

    let quote = db::insert_quote(
        pool,
        issue_date,
        &client,
        request.site_address.trim(),
        &items,
        &totals,
    )
    .await?;

    info!(
        "Created quote {} for '{}' with {} items, net {}",
        quote.display_number(),
        quote.client.name,
        quote.items.len(),
        quote.total_net
    );
    Ok(quote)
}

/// Replace a quote's lines, recomputing and persisting totals with them
pub async fn update_quote_items(
    pool: &PgPool,
    cache: &AppCache,
    policy: &VatPolicy,
    id: Uuid,
    request: &UpdateItemsRequest,
) -> Result<Quote> {
    let items = parse_items(&request.items, policy)?;
    let totals = get_quote_totals(&items);

    let quote =
        db::update_items_and_totals(pool, id, &items, &totals, request.expected_version).await?;
    cache.invalidate_document(id).await;

    info!(
        "Updated items of quote {} (version {}), net {} vat {}",
        quote.display_number(),
        quote.version,
        totals.total_net,
        totals.total_vat
    );
    Ok(quote)
}

/// Move a quote along draft -> sent -> accepted | rejected
pub async fn change_status(
    pool: &PgPool,
    cache: &AppCache,
    id: Uuid,
    to: QuoteStatus,
) -> Result<Quote> {
    let quote = db::get_quote(pool, id).await?;
    let from = quote.status;

    if !from.can_transition_to(to) {
        return Err(AppError::InvalidTransition { from, to });
    }
    if from == to {
        debug!("Quote {} already {}", quote.display_number(), to);
        return Ok(quote);
    }

    let quote = db::update_status(pool, id, from, to).await?;
    cache.invalidate_document(id).await;

    info!("Quote {} moved from {} to {}", quote.display_number(), from, to);
    Ok(quote)
}

/// Quote with a fresh breakdown and a flag for drifted cached totals
pub fn quote_detail(quote: Quote, currency: &str) -> QuoteDetailResponse {
    let (rows, totals) = quote_breakdown(&quote.items);

    let stale = quote.total_net != totals.total_net
        || quote.total_vat != totals.total_vat
        || quote.total_gross != totals.total_gross();

    if stale {
        tracing::warn!(
            "Quote {} has stale cached totals (cached net {}, computed {})",
            quote.display_number(),
            quote.total_net,
            totals.total_net
        );
    }

    QuoteDetailResponse {
        display_number: quote.display_number(),
        breakdown: QuoteTotalsResponse::new(rows, totals, currency),
        stale,
        quote,
    }
}

/// Rendered document for a quote, reusing the cached copy for the same version
pub async fn quote_document(
    pool: &PgPool,
    cache: &AppCache,
    settings: &DocumentSettings,
    id: Uuid,
) -> Result<Arc<RenderedDocument>> {
    let quote = db::get_quote(pool, id).await?;

    if let Some(doc) = cache.document(id, quote.version).await {
        debug!("Cache HIT for document: {}", quote.display_number());
        return Ok(doc);
    }

    debug!("Cache MISS for document: {}", quote.display_number());
    let html = render_quote_document(&quote, settings)?;
    cache.store_document(id, quote.version, html.clone()).await;

    Ok(Arc::new(RenderedDocument {
        version: quote.version,
        html,
    }))
}

/// Persist a shopping list derived from a quote's detailed materials
pub async fn generate_shopping_list(
    pool: &PgPool,
    quote_id: Uuid,
    name: Option<&str>,
) -> Result<ShoppingList> {
    let quote = db::get_quote(pool, quote_id).await?;
    let entries = shopping_entries(&quote.items);

    let name = match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => format!("Materials for {}", quote.display_number()),
    };

    let list = db::insert_shopping_list(pool, &name, Some(quote_id), &entries).await?;
    info!(
        "Created shopping list '{}' with {} entries from quote {}",
        list.name,
        list.entries.len(),
        quote.display_number()
    );
    Ok(list)
}

/// Flip the `checked` flag of one shopping list entry.
///
/// The flip happens inside a single UPDATE, so concurrent toggles of
/// different entries on the same list never overwrite each other.
pub async fn toggle_shopping_entry(
    pool: &PgPool,
    list_id: Uuid,
    index: usize,
) -> Result<ShoppingList> {
    let entry_missing = || AppError::NotFound(format!("Shopping list entry {}", index));
    let position = i32::try_from(index).map_err(|_| entry_missing())?;

    match db::toggle_shopping_entry(pool, list_id, position).await? {
        Some(list) => {
            debug!("Toggled entry {} of shopping list {}", index, list_id);
            Ok(list)
        }
        None => {
            // distinguishes a missing list from an out-of-range entry
            db::get_shopping_list(pool, list_id).await?;
            Err(entry_missing())
        }
    }
}
