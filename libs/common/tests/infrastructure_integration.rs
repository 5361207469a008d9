//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database and Redis cache
//! are properly configured and accessible from the services.

use common::{
    cache::{RedisCache, RedisConfig},
    database::{DatabaseConfig, health_check, init_pool},
};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires running PostgreSQL and Redis"]
async fn test_infrastructure_integration() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    assert!(health_check(&pool).await?, "Database health check failed");

    let row = sqlx::query("SELECT 1 as result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1, "PostgreSQL simple query test failed");

    let redis_config = RedisConfig::from_env()?;
    let redis = RedisCache::open(&redis_config)?;
    redis.ping().await?;

    let key = "integration:services:salon";
    redis.put(key, "[]", 10).await?;
    assert_eq!(redis.fetch(key).await?, Some("[]".to_string()));
    assert!(redis.evict(key).await?, "Redis evict operation failed");
    assert_eq!(redis.fetch(key).await?, None);

    Ok(())
}
