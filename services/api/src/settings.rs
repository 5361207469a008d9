//! Service settings
//!
//! Defaults overridden by `SALON__*` environment variables, e.g.
//! `SALON__SERVER__PORT=8080` or `SALON__LEDGER__COMMISSION_RATE=0.07`.

use config::{Config, ConfigError, Environment, Map};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerSettings {
    /// Share of an order total accrued as platform commission
    pub commission_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogCacheSettings {
    pub enabled: bool,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub ledger: LedgerSettings,
    pub catalog_cache: CatalogCacheSettings,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    fn load(vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3001)?
            .set_default("ledger.commission_rate", domain::DEFAULT_COMMISSION_RATE)?
            .set_default("catalog_cache.enabled", false)?
            .set_default("catalog_cache.ttl_seconds", 300)?
            .add_source(
                Environment::with_prefix("SALON")
                    .separator("__")
                    .try_parsing(true)
                    .source(vars),
            )
            .build()?
            .try_deserialize()?;

        let rate = settings.ledger.commission_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::Message(format!(
                "ledger.commission_rate must be between 0 and 1, got {}",
                rate
            )));
        }

        Ok(settings)
    }
}
