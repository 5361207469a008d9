//! Application state shared across handlers

use domain::{Ledger, Scheduler, ServiceCatalog};
use sqlx::PgPool;

use crate::{catalog_cache::CatalogCache, middleware::TokenVerifier};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub catalog: ServiceCatalog,
    pub scheduler: Scheduler,
    pub ledger: Ledger,
    pub catalog_cache: Option<CatalogCache>,
    pub token_verifier: TokenVerifier,
}
