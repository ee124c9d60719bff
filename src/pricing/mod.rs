//! Pricing engine module.
//!
//! Labor, material and VAT calculations for quote lines, the validation
//! boundary in front of them, and the quote workflows built on top.

pub mod calculators;
pub mod materials;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod services;
pub mod validation;

// Re-export commonly used items
pub use calculators::{
    calculate_item_labor, calculate_item_materials, calculate_item_total, format_money,
    get_quote_totals, item_breakdown, round_money, ItemBreakdown, ItemTotal, QuoteTotals,
};
pub use routes::router;
pub use validation::{ValidationError, VatPolicy};
