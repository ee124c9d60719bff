//! Shopping list models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One material to buy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListEntry {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub quantity: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_price: Decimal,
    #[serde(default)]
    pub checked: bool,
}

impl ShoppingListEntry {
    pub fn cost(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Shopping list from the `shopping_lists` table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShoppingList {
    pub id: Uuid,
    pub name: String,
    pub quote_id: Option<Uuid>,
    pub entries: Json<Vec<ShoppingListEntry>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
