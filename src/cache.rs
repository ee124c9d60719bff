//! In-memory caching using moka
//!
//! Catalog services are read on every quote created from the catalog, and
//! rendered documents are re-requested whenever a quote is shared, so both
//! are kept in process.

use moka::future::Cache;
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::db;
use crate::error::Result;
use crate::models::Service;

/// A rendered quote document, tagged with the quote version it was built from
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub version: i32,
    pub html: String,
}

/// Application cache holding catalog services and rendered documents
#[derive(Clone)]
pub struct AppCache {
    /// Catalog services (id -> Service)
    pub services: Cache<Uuid, Arc<Service>>,
    /// Rendered quote documents (quote id -> document)
    pub documents: Cache<Uuid, Arc<RenderedDocument>>,
}

impl AppCache {
    /// Create a new cache instance with configured TTLs
    pub fn new() -> Self {
        Self {
            // Catalog: 1000 services, 30 min TTL
            services: Cache::builder()
                .max_capacity(1000)
                .time_to_live(Duration::from_secs(30 * 60))
                .build(),

            // Documents: 200 entries, 15 min idle
            documents: Cache::builder()
                .max_capacity(200)
                .time_to_live(Duration::from_secs(60 * 60))
                .time_to_idle(Duration::from_secs(15 * 60))
                .build(),
        }
    }

    /// Get cache statistics for monitoring
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            services_size: self.services.entry_count(),
            documents_size: self.documents.entry_count(),
        }
    }

    /// Fetch a catalog service, consulting the cache first
    pub async fn service(&self, pool: &PgPool, id: Uuid) -> Result<Arc<Service>> {
        if let Some(cached) = self.services.get(&id).await {
            debug!("Cache HIT for service: {}", id);
            return Ok(cached);
        }

        debug!("Cache MISS for service: {}", id);
        let service = Arc::new(db::get_service(pool, id).await?);
        self.services.insert(id, service.clone()).await;
        Ok(service)
    }

    pub async fn store_service(&self, service: Service) {
        self.services.insert(service.id, Arc::new(service)).await;
    }

    pub async fn invalidate_service(&self, id: Uuid) {
        self.services.invalidate(&id).await;
        info!("Cache invalidated for service: {}", id);
    }

    /// Rendered document for the given quote version, if cached
    pub async fn document(&self, quote_id: Uuid, version: i32) -> Option<Arc<RenderedDocument>> {
        self.documents
            .get(&quote_id)
            .await
            .filter(|doc| doc.version == version)
    }

    pub async fn store_document(&self, quote_id: Uuid, version: i32, html: String) {
        self.documents
            .insert(quote_id, Arc::new(RenderedDocument { version, html }))
            .await;
    }

    pub async fn invalidate_document(&self, quote_id: Uuid) {
        self.documents.invalidate(&quote_id).await;
        debug!("Document cache invalidated for quote: {}", quote_id);
    }
}

impl Default for AppCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics for monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub services_size: u64,
    pub documents_size: u64,
}

/// Start background cache warmer
///
/// Loads the service catalog on startup and refreshes it every 10 minutes.
pub async fn start_cache_warmer(cache: AppCache, db: PgPool) {
    let mut interval = interval(Duration::from_secs(10 * 60));
    loop {
        // first tick completes immediately
        interval.tick().await;
        warm_cache(&cache, &db).await;
    }
}

async fn warm_cache(cache: &AppCache, db: &PgPool) {
    info!("Starting cache warm-up...");

    match db::list_services(db).await {
        Ok(services) => {
            for service in services {
                cache.store_service(service).await;
            }
        }
        Err(e) => warn!("Failed to warm service cache: {}", e),
    }

    cache.services.run_pending_tasks().await;
    info!("Cache warm-up complete. Stats: {:?}", cache.stats());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_document_cache_checks_version() {
        let cache = AppCache::new();
        let quote_id = Uuid::new_v4();

        cache
            .store_document(quote_id, 3, "<html>v3</html>".to_string())
            .await;

        let hit = cache.document(quote_id, 3).await.unwrap();
        assert_eq!(hit.html, "<html>v3</html>");
        assert!(cache.document(quote_id, 4).await.is_none());

        cache.invalidate_document(quote_id).await;
        assert!(cache.document(quote_id, 3).await.is_none());
    }
}
