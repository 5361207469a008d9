use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod catalog_cache;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod settings;
mod state;

use common::{
    cache::{RedisCache, RedisConfig},
    database::{DatabaseConfig, init_pool},
    error::DatabaseError,
};
use domain::{Ledger, Scheduler, ServiceCatalog};

use crate::{
    catalog_cache::CatalogCache,
    middleware::{JwtConfig, TokenVerifier},
    repositories::{
        PgAppointmentRepository, PgCommissionRepository, PgOrderRepository, PgServiceRepository,
    },
    settings::Settings,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting API service");

    let settings = Settings::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    info!("Database migrations applied");

    // Initialize repositories
    let services = Arc::new(PgServiceRepository::new(pool.clone()));
    let appointments = Arc::new(PgAppointmentRepository::new(pool.clone()));
    let orders = Arc::new(PgOrderRepository::new(pool.clone()));
    let commissions = Arc::new(PgCommissionRepository::new(pool.clone()));

    let catalog_cache = if settings.catalog_cache.enabled {
        let redis = RedisCache::open(&RedisConfig::from_env()?)?;
        if let Err(e) = redis.ping().await {
            warn!("Redis is not answering ({}); catalog reads will fall back to the database", e);
        }
        Some(CatalogCache::new(redis, settings.catalog_cache.ttl_seconds))
    } else {
        None
    };

    let jwt_config = JwtConfig::from_env().map_err(anyhow::Error::msg)?;
    let token_verifier = TokenVerifier::from_config(&jwt_config)?;

    let app_state = AppState {
        db_pool: pool,
        catalog: ServiceCatalog::new(services.clone()),
        scheduler: Scheduler::new(appointments, services),
        ledger: Ledger::new(orders, commissions, settings.ledger.commission_rate),
        catalog_cache,
        token_verifier,
    };

    info!(
        "API service initialized successfully (commission rate {})",
        settings.ledger.commission_rate
    );

    // Start the web server
    let app = routes::create_router(app_state);

    let addr = settings.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
