//! Service catalog models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::AppError;

use super::quote::{MaterialItem, MaterialMode};

/// Service row from the `services` table
#[derive(Debug, Clone, FromRow)]
pub struct ServiceRecord {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    pub net_price: Decimal,
    pub vat_rate: Decimal,
    pub material_mode: String,
    pub estimated_material_price: Option<Decimal>,
    pub materials: Json<Vec<MaterialItem>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceRecord {
    pub fn into_service(self) -> Result<Service, AppError> {
        let material_mode = self.material_mode.parse::<MaterialMode>().map_err(|e| {
            AppError::Internal(format!("Service {} has unreadable mode: {}", self.id, e))
        })?;

        Ok(Service {
            id: self.id,
            name: self.name,
            unit: self.unit,
            net_price: self.net_price,
            vat_rate: self.vat_rate,
            material_mode,
            estimated_material_price: self.estimated_material_price,
            materials: self.materials.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Reusable template for quote lines (same pricing fields, no quantity)
#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub unit: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub net_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub vat_rate: Decimal,
    pub material_mode: MaterialMode,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub estimated_material_price: Option<Decimal>,
    pub materials: Vec<MaterialItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated fields for creating or replacing a catalog service
#[derive(Debug, Clone)]
pub struct ServiceFields {
    pub name: String,
    pub unit: String,
    pub net_price: Decimal,
    pub vat_rate: Decimal,
    pub material_mode: MaterialMode,
    pub estimated_material_price: Option<Decimal>,
    pub materials: Vec<MaterialItem>,
}
