//! Request DTOs for pricing and quote endpoints.
//!
//! Numeric fields are raw strings exactly as typed into the form; they are
//! parsed by `pricing::validation`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::models::{ClientSnapshot, QuoteStatus};

/// Accept a numeric form field either as JSON text or as a JSON number
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    }))
}

/// A material row as entered in the form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub consumption: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub quantity: Option<String>,
}

/// A quote line as entered in the form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteItemInput {
    #[serde(default)]
    pub service_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub net_price: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub quantity: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub vat_rate: Option<String>,
    #[serde(default)]
    pub material_mode: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub estimated_material_price: Option<String>,
    #[serde(default)]
    pub materials: Vec<MaterialInput>,
}

/// Catalog service as entered in the form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub net_price: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub vat_rate: Option<String>,
    #[serde(default)]
    pub material_mode: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub estimated_material_price: Option<String>,
    #[serde(default)]
    pub materials: Vec<MaterialInput>,
}

/// Request to price a list of lines without saving anything
#[derive(Debug, Deserialize)]
pub struct CalculateTotalsRequest {
    #[serde(default)]
    pub items: Vec<QuoteItemInput>,
}

/// A line added from the service catalog
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogLineInput {
    pub service_id: Uuid,
    pub quantity: String,
}

/// Request to create a quote
#[derive(Debug, Deserialize)]
pub struct CreateQuoteRequest {
    /// Client to copy contact data from
    #[serde(default)]
    pub client_id: Option<Uuid>,
    /// Ad hoc client data, used when `client_id` is absent
    #[serde(default)]
    pub client: Option<ClientSnapshot>,
    #[serde(default)]
    pub site_address: String,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<QuoteItemInput>,
    #[serde(default)]
    pub catalog_items: Vec<CatalogLineInput>,
}

/// Request to replace a quote's lines
#[derive(Debug, Deserialize)]
pub struct UpdateItemsRequest {
    #[serde(default)]
    pub items: Vec<QuoteItemInput>,
    /// Optimistic concurrency check against the stored version
    #[serde(default)]
    pub expected_version: Option<i32>,
}

/// Request to move a quote to a new status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: QuoteStatus,
}

/// Request to derive a shopping list from a quote
#[derive(Debug, Default, Deserialize)]
pub struct CreateShoppingListRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_fields_accept_text_and_numbers() {
        let input: QuoteItemInput = serde_json::from_str(
            r#"{"name":"Skirting","net_price":12.5,"quantity":"4","vat_rate":23,"estimated_material_price":null}"#,
        )
        .unwrap();

        assert_eq!(input.net_price.as_deref(), Some("12.5"));
        assert_eq!(input.quantity.as_deref(), Some("4"));
        assert_eq!(input.vat_rate.as_deref(), Some("23"));
        assert_eq!(input.estimated_material_price, None);
        assert_eq!(input.material_mode, None);
        assert!(input.materials.is_empty());
    }

    #[test]
    fn test_status_request_uses_snake_case() {
        let request: UpdateStatusRequest = serde_json::from_str(r#"{"status":"accepted"}"#).unwrap();
        assert_eq!(request.status, QuoteStatus::Accepted);
        assert!(serde_json::from_str::<UpdateStatusRequest>(r#"{"status":"archived"}"#).is_err());
    }
}
