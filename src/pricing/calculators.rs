//! Core pricing calculation functions.
//!
//! Pure functions for quote math - no database access, no rounding.
//! The quote editor, the quote detail view and the printable document all
//! derive their figures from here so they can never disagree.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{MaterialMode, QuoteItem};

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// Only used when formatting figures for display. Calculations keep full
/// precision.
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use tradequote::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));   // rounds to even
/// assert_eq!(round_money(dec!(3.5), 0), dec!(4));   // rounds to even
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Format an amount for display with exactly two decimal places.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tradequote::pricing::format_money;
///
/// assert_eq!(format_money(dec!(50.6), "PLN"), "50.60 PLN");
/// ```
pub fn format_money(amount: Decimal, currency: &str) -> String {
    let mut rounded = round_money(amount, 2);
    rounded.rescale(2);
    format!("{} {}", rounded, currency)
}

/// Labor cost of a line: `net_price * quantity`.
pub fn calculate_item_labor(item: &QuoteItem) -> Decimal {
    item.net_price * item.quantity
}

/// Material cost of a line.
///
/// In estimated mode this is the flat per-unit estimate times the line
/// quantity. In detailed mode every material is scaled by its consumption
/// and by the line quantity, so the line's measure (m², m, pcs) applies
/// uniformly to all materials.
pub fn calculate_item_materials(item: &QuoteItem) -> Decimal {
    match item.material_mode {
        MaterialMode::Estimated => {
            item.estimated_material_price.unwrap_or(Decimal::ZERO) * item.quantity
        }
        MaterialMode::Detailed => item
            .materials
            .iter()
            .map(|m| m.price * m.consumption_or_default() * item.quantity)
            .sum(),
    }
}

/// Net, VAT and gross for a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ItemTotal {
    #[serde(with = "rust_decimal::serde::str")]
    pub net: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub vat: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub gross: Decimal,
}

/// Calculate net, VAT and gross for a line.
///
/// `vat_rate` is a whole-number percentage; it is applied to the line's own
/// net amount.
pub fn calculate_item_total(item: &QuoteItem) -> ItemTotal {
    let net = calculate_item_labor(item) + calculate_item_materials(item);
    let vat = net * (item.vat_rate / Decimal::ONE_HUNDRED);

    ItemTotal {
        net,
        vat,
        gross: net + vat,
    }
}

/// Aggregated totals for a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct QuoteTotals {
    #[serde(with = "rust_decimal::serde::str")]
    pub labor_net: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub materials_net: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_net: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_vat: Decimal,
}

impl QuoteTotals {
    pub fn total_gross(&self) -> Decimal {
        self.total_net + self.total_vat
    }
}

/// Sum labor, materials, net and VAT over all lines.
///
/// VAT is summed per line, so quotes mixing rates (e.g. 8% and 23%) get
/// each line's own rate. An empty slice yields all zeros.
pub fn get_quote_totals(items: &[QuoteItem]) -> QuoteTotals {
    items.iter().fold(QuoteTotals::default(), |mut acc, item| {
        let total = calculate_item_total(item);
        acc.labor_net += calculate_item_labor(item);
        acc.materials_net += calculate_item_materials(item);
        acc.total_net += total.net;
        acc.total_vat += total.vat;
        acc
    })
}

// ==================== checked arithmetic ====================

/// [`calculate_item_materials`] returning `None` on `Decimal` overflow
pub fn checked_item_materials(item: &QuoteItem) -> Option<Decimal> {
    match item.material_mode {
        MaterialMode::Estimated => item
            .estimated_material_price
            .unwrap_or(Decimal::ZERO)
            .checked_mul(item.quantity),
        MaterialMode::Detailed => item.materials.iter().try_fold(Decimal::ZERO, |acc, m| {
            let cost = m
                .price
                .checked_mul(m.consumption_or_default())?
                .checked_mul(item.quantity)?;
            acc.checked_add(cost)
        }),
    }
}

/// [`calculate_item_total`] returning `None` on `Decimal` overflow.
///
/// Performs the same operations in the same order, so when this succeeds
/// the unchecked version cannot panic for the same line.
pub fn checked_item_total(item: &QuoteItem) -> Option<ItemTotal> {
    let labor = item.net_price.checked_mul(item.quantity)?;
    let net = labor.checked_add(checked_item_materials(item)?)?;
    let vat = net.checked_mul(item.vat_rate.checked_div(Decimal::ONE_HUNDRED)?)?;

    Some(ItemTotal {
        net,
        vat,
        gross: net.checked_add(vat)?,
    })
}

/// [`get_quote_totals`] returning `None` on `Decimal` overflow, including
/// overflow of the gross total.
pub fn checked_quote_totals(items: &[QuoteItem]) -> Option<QuoteTotals> {
    let totals = items.iter().try_fold(QuoteTotals::default(), |acc, item| {
        let total = checked_item_total(item)?;
        Some(QuoteTotals {
            labor_net: acc
                .labor_net
                .checked_add(item.net_price.checked_mul(item.quantity)?)?,
            materials_net: acc.materials_net.checked_add(checked_item_materials(item)?)?,
            total_net: acc.total_net.checked_add(total.net)?,
            total_vat: acc.total_vat.checked_add(total.vat)?,
        })
    })?;

    totals.total_net.checked_add(totals.total_vat)?;
    Some(totals)
}

/// Per-line view shared by the editor, detail view and document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemBreakdown {
    pub name: String,
    pub unit: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub net_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub vat_rate: Decimal,
    pub material_mode: MaterialMode,
    #[serde(with = "rust_decimal::serde::str")]
    pub labor: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub materials: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub net: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub vat: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub gross: Decimal,
}

/// Full breakdown of a single line
pub fn item_breakdown(item: &QuoteItem) -> ItemBreakdown {
    let total = calculate_item_total(item);

    ItemBreakdown {
        name: item.name.clone(),
        unit: item.unit.clone(),
        quantity: item.quantity,
        net_price: item.net_price,
        vat_rate: item.vat_rate,
        material_mode: item.material_mode,
        labor: calculate_item_labor(item),
        materials: calculate_item_materials(item),
        net: total.net,
        vat: total.vat,
        gross: total.gross,
    }
}

/// Breakdown of every line plus the aggregate totals
pub fn quote_breakdown(items: &[QuoteItem]) -> (Vec<ItemBreakdown>, QuoteTotals) {
    (items.iter().map(item_breakdown).collect(), get_quote_totals(items))
}
