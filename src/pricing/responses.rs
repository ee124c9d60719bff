//! Response DTOs for pricing and quote endpoints.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Quote, ShoppingList};

use super::calculators::{ItemBreakdown, ItemTotal, QuoteTotals};
use super::materials::shopping_total;

/// Totals for a single line
#[derive(Debug, Serialize)]
pub struct ItemTotalResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub labor: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub materials: Decimal,
    #[serde(flatten)]
    pub total: ItemTotal,
}

/// Totals for a list of lines
#[derive(Debug, Serialize)]
pub struct QuoteTotalsResponse {
    pub items: Vec<ItemBreakdown>,
    #[serde(flatten)]
    pub totals: QuoteTotals,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_gross: Decimal,
    pub currency: String,
}

impl QuoteTotalsResponse {
    pub fn new(items: Vec<ItemBreakdown>, totals: QuoteTotals, currency: &str) -> Self {
        Self {
            items,
            total_gross: totals.total_gross(),
            totals,
            currency: currency.to_string(),
        }
    }
}

/// Quote with a freshly recomputed breakdown
#[derive(Debug, Serialize)]
pub struct QuoteDetailResponse {
    pub quote: Quote,
    pub display_number: String,
    pub breakdown: QuoteTotalsResponse,
    /// True when the cached totals on the quote differ from the recomputation
    pub stale: bool,
}

/// Shopping list with its purchase cost
#[derive(Debug, Serialize)]
pub struct ShoppingListResponse {
    #[serde(flatten)]
    pub list: ShoppingList,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    pub currency: String,
}

impl ShoppingListResponse {
    pub fn new(list: ShoppingList, currency: &str) -> Self {
        Self {
            total: shopping_total(&list.entries),
            list,
            currency: currency.to_string(),
        }
    }
}

/// Generic error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
