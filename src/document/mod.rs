//! Printable quote document.
//!
//! Renders an HTML page that the client-side PDF printer consumes. All
//! figures come from `pricing::calculators`; nothing here does arithmetic.

use askama::Template;

use crate::error::Result;
use crate::models::Quote;
use crate::pricing::calculators::{quote_breakdown, ItemBreakdown};
use crate::pricing::format_money;

/// Company and formatting settings printed on every document
#[derive(Debug, Clone, Default)]
pub struct DocumentSettings {
    pub company_name: String,
    pub company_details: String,
    pub currency: String,
}

/// One table row on the document
struct DocumentRow {
    position: usize,
    name: String,
    unit: String,
    quantity: String,
    net_price: String,
    labor: String,
    materials: String,
    net: String,
    vat_rate: String,
    vat: String,
    gross: String,
}

impl DocumentRow {
    fn new(position: usize, row: &ItemBreakdown, currency: &str) -> Self {
        Self {
            position,
            name: row.name.clone(),
            unit: row.unit.clone(),
            quantity: row.quantity.normalize().to_string(),
            net_price: format_money(row.net_price, currency),
            labor: format_money(row.labor, currency),
            materials: format_money(row.materials, currency),
            net: format_money(row.net, currency),
            vat_rate: format!("{}%", row.vat_rate.normalize()),
            vat: format_money(row.vat, currency),
            gross: format_money(row.gross, currency),
        }
    }
}

#[derive(Template)]
#[template(path = "quote/document.html")]
struct QuoteDocumentTemplate {
    company_name: String,
    company_details: String,
    has_company_details: bool,
    number: String,
    issue_date: String,
    status: String,
    client_name: String,
    client_address: String,
    client_phone: String,
    client_email: String,
    site_address: String,
    has_site_address: bool,
    rows: Vec<DocumentRow>,
    has_rows: bool,
    labor_net: String,
    materials_net: String,
    total_net: String,
    total_vat: String,
    total_gross: String,
}

/// Render the printable rendition of a quote.
///
/// Totals are recomputed from the quote's items, so the document always
/// agrees with the detail view even if the cached columns are stale.
pub fn render_quote_document(quote: &Quote, settings: &DocumentSettings) -> Result<String> {
    let currency = settings.currency.as_str();
    let (breakdown, totals) = quote_breakdown(&quote.items);

    let rows: Vec<DocumentRow> = breakdown
        .iter()
        .enumerate()
        .map(|(i, row)| DocumentRow::new(i + 1, row, currency))
        .collect();

    let template = QuoteDocumentTemplate {
        company_name: settings.company_name.clone(),
        company_details: settings.company_details.clone(),
        has_company_details: !settings.company_details.is_empty(),
        number: quote.display_number(),
        issue_date: quote.issue_date.format("%Y-%m-%d").to_string(),
        status: quote.status.to_string(),
        client_name: quote.client.name.clone(),
        client_address: quote.client.address.clone(),
        client_phone: quote.client.phone.clone(),
        client_email: quote.client.email.clone(),
        site_address: quote.site_address.clone(),
        has_site_address: !quote.site_address.is_empty(),
        has_rows: !rows.is_empty(),
        rows,
        labor_net: format_money(totals.labor_net, currency),
        materials_net: format_money(totals.materials_net, currency),
        total_net: format_money(totals.total_net, currency),
        total_vat: format_money(totals.total_vat, currency),
        total_gross: format_money(totals.total_gross(), currency),
    };

    Ok(template.render()?)
}
