//! Redis cache module
//!
//! Small TTL cache for read-mostly reference data such as per-salon service
//! listings. Every key is namespaced with the configured prefix so several
//! deployments can share one Redis.

use anyhow::{Result, bail};
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tracing::{debug, info};

/// Configuration for the Redis cache
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
    /// Namespace prepended to every key
    pub key_prefix: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    /// - `REDIS_KEY_PREFIX`: key namespace (default: "salon_desk")
    pub fn from_env() -> Result<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        let key_prefix =
            std::env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "salon_desk".to_string());

        if key_prefix.is_empty() {
            bail!("REDIS_KEY_PREFIX must not be empty");
        }

        Ok(RedisConfig { url, key_prefix })
    }
}

/// Handle on a Redis server; cheap to clone
#[derive(Clone)]
pub struct RedisCache {
    client: Client,
    key_prefix: String,
}

impl RedisCache {
    /// Parse the URL. No connection is made until the first command.
    pub fn open(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        info!("Redis cache configured for {} (prefix {})", config.url, config.key_prefix);
        Ok(RedisCache {
            client,
            key_prefix: config.key_prefix.clone(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }

    /// Store `value` under `key`, expiring after `ttl_seconds`
    pub async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut conn = self.connection().await?;
        let _: () = conn.set_ex(self.namespaced(key), value, ttl_seconds).await?;
        Ok(())
    }

    pub async fn fetch(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(self.namespaced(key)).await?;
        Ok(value)
    }

    /// Drop a key; `true` when something was removed
    pub async fn evict(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection().await?;
        let removed: u64 = conn.del(self.namespaced(key)).await?;
        debug!("Evicted {} ({} removed)", key, removed);
        Ok(removed > 0)
    }

    /// Fails unless the server answers PING
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong != "PONG" {
            bail!("unexpected PING reply: {}", pong);
        }
        Ok(())
    }
}
