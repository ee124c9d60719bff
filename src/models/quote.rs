//! Quote, line item and material models.
//!
//! Quotes are stored with their items embedded as JSONB and with cached
//! totals in NUMERIC columns. `QuoteRecord` is the raw row; `Quote` is the
//! typed view handed to the rest of the application.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

use super::catalog::Service;

/// How material cost is derived for a line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaterialMode {
    /// Flat material price per unit of the line's measure
    #[default]
    Estimated,
    /// Itemized materials, each with its own price and consumption
    Detailed,
}

impl MaterialMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialMode::Estimated => "estimated",
            MaterialMode::Detailed => "detailed",
        }
    }
}

impl std::fmt::Display for MaterialMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MaterialMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "estimated" => Ok(MaterialMode::Estimated),
            "detailed" => Ok(MaterialMode::Detailed),
            other => Err(format!(
                "Invalid material mode: {}. Use estimated or detailed",
                other
            )),
        }
    }
}

/// Quote lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
        }
    }

    /// Whether a quote may move from `self` to `next`.
    ///
    /// Progression is linear: draft -> sent -> accepted | rejected.
    /// Re-applying the current status is allowed and has no effect.
    pub fn can_transition_to(self, next: QuoteStatus) -> bool {
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (QuoteStatus::Draft, QuoteStatus::Sent)
                | (QuoteStatus::Sent, QuoteStatus::Accepted)
                | (QuoteStatus::Sent, QuoteStatus::Rejected)
        )
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Ok(QuoteStatus::Draft),
            "sent" => Ok(QuoteStatus::Sent),
            "accepted" => Ok(QuoteStatus::Accepted),
            "rejected" => Ok(QuoteStatus::Rejected),
            other => Err(format!(
                "Invalid quote status: {}. Use draft, sent, accepted, or rejected",
                other
            )),
        }
    }
}

/// A material consumed by a service line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialItem {
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(default)]
    pub unit: String,
    /// Material quantity per one unit of the parent line (1 when unset)
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub consumption: Option<Decimal>,
    /// Display-only, never used in cost computation
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub quantity: Option<Decimal>,
}

impl MaterialItem {
    pub fn consumption_or_default(&self) -> Decimal {
        self.consumption.unwrap_or(Decimal::ONE)
    }
}

/// One priced line within a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    /// Catalog service this line was copied from; `None` for custom lines
    #[serde(default)]
    pub service_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub net_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub vat_rate: Decimal,
    #[serde(default)]
    pub material_mode: MaterialMode,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub estimated_material_price: Option<Decimal>,
    #[serde(default)]
    pub materials: Vec<MaterialItem>,
}

impl QuoteItem {
    pub fn is_custom(&self) -> bool {
        self.service_id.is_none()
    }

    /// Build a line from a catalog entry. The catalog fields are copied, so
    /// later edits to or removal of the service do not affect the line.
    pub fn from_service(service: &Service, quantity: Decimal) -> Self {
        Self {
            service_id: Some(service.id),
            name: service.name.clone(),
            unit: service.unit.clone(),
            net_price: service.net_price,
            quantity,
            vat_rate: service.vat_rate,
            material_mode: service.material_mode,
            estimated_material_price: service.estimated_material_price,
            materials: service.materials.clone(),
        }
    }
}

/// Quote row from the `quotes` table
#[derive(Debug, Clone, FromRow)]
pub struct QuoteRecord {
    pub id: Uuid,
    pub number: i64,
    pub issue_date: NaiveDate,
    pub client_id: Option<Uuid>,
    pub client_name: String,
    pub client_phone: String,
    pub client_email: String,
    pub client_address: String,
    pub site_address: String,
    pub status: String,
    pub items: Json<Vec<QuoteItem>>,
    pub total_net: Decimal,
    pub total_vat: Decimal,
    pub total_gross: Decimal,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuoteRecord {
    /// Convert the raw row into a typed quote
    pub fn into_quote(self) -> Result<Quote, AppError> {
        let status = self.status.parse::<QuoteStatus>().map_err(|e| {
            AppError::Internal(format!("Quote {} has unreadable status: {}", self.id, e))
        })?;

        Ok(Quote {
            id: self.id,
            number: self.number,
            issue_date: self.issue_date,
            client: ClientSnapshot {
                client_id: self.client_id,
                name: self.client_name,
                phone: self.client_phone,
                email: self.client_email,
                address: self.client_address,
            },
            site_address: self.site_address,
            status,
            items: self.items.0,
            total_net: self.total_net,
            total_vat: self.total_vat,
            total_gross: self.total_gross,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Client data copied into a quote when it is created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientSnapshot {
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

/// A priced proposal document
#[derive(Debug, Clone, Serialize)]
pub struct Quote {
    pub id: Uuid,
    pub number: i64,
    pub issue_date: NaiveDate,
    pub client: ClientSnapshot,
    pub site_address: String,
    pub status: QuoteStatus,
    pub items: Vec<QuoteItem>,
    /// Cached at last save; recompute from `items` before trusting
    #[serde(with = "rust_decimal::serde::str")]
    pub total_net: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_vat: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_gross: Decimal,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Display number, e.g. `Q-0042`
    pub fn display_number(&self) -> String {
        format!("Q-{:04}", self.number)
    }
}
