//! Read-through cache for per-salon service listings
//!
//! Redis errors never fail a request: they are logged and the caller falls
//! back to the record store.

use common::cache::RedisCache;
use domain::models::Service;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct CatalogCache {
    redis: RedisCache,
    ttl_seconds: u64,
}

pub fn cache_key(salon_id: Uuid) -> String {
    format!("services:salon:{}", salon_id)
}

impl CatalogCache {
    pub fn new(redis: RedisCache, ttl_seconds: u64) -> Self {
        Self { redis, ttl_seconds }
    }

    pub async fn get(&self, salon_id: Uuid) -> Option<Vec<Service>> {
        let key = cache_key(salon_id);
        let raw = match self.redis.fetch(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Catalog cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(services) => {
                debug!("Catalog cache hit for {}", key);
                Some(services)
            }
            Err(e) => {
                warn!("Discarding unreadable catalog cache entry {}: {}", key, e);
                None
            }
        }
    }

    pub async fn put(&self, salon_id: Uuid, services: &[Service]) {
        let key = cache_key(salon_id);
        let raw = match serde_json::to_string(services) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to encode catalog for {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.redis.put(&key, &raw, self.ttl_seconds).await {
            warn!("Catalog cache write failed for {}: {}", key, e);
        }
    }

    pub async fn invalidate(&self, salon_id: Uuid) {
        let key = cache_key(salon_id);
        if let Err(e) = self.redis.evict(&key).await {
            warn!("Catalog cache invalidation failed for {}: {}", key, e);
        }
    }
}
