//! Quote pricing and document service for tradespeople.
//!
//! The core is [`pricing::calculators`]: pure labor, material and VAT math for
//! quote lines. Everything else (catalog, quotes, documents, shopping lists)
//! consumes it.

pub mod cache;
pub mod config;
pub mod db;
pub mod document;
pub mod error;
pub mod models;
pub mod pricing;
pub mod routes;

use sqlx::PgPool;
use std::sync::Arc;

use cache::AppCache;
use config::Config;
use document::DocumentSettings;
use pricing::VatPolicy;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub cache: AppCache,
    pub config: Arc<Config>,
    pub vat_policy: Arc<VatPolicy>,
    pub documents: Arc<DocumentSettings>,
}

impl AppState {
    pub fn new(db: PgPool, cache: AppCache, config: Config) -> Self {
        Self {
            db,
            cache,
            vat_policy: Arc::new(config.vat_policy()),
            documents: Arc::new(config.document_settings()),
            config: Arc::new(config),
        }
    }
}
