//! Configuration - passed from higher layers

use std::path::PathBuf;
use std::time::Duration;

use crate::core::keys::{env, price, qr, storage};

/// QR color service configuration.
#[derive(Debug, Clone)]
pub struct ColorConfig {
    /// Durable record holding the table
    pub storage_key: String,
    /// Addresses with the reserved color pair
    pub privileged: Vec<String>,
    /// Fixed RNG seed (tests, demos). `None` draws from OS entropy.
    pub seed: Option<u64>,
    pub max_attempts: usize,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            storage_key: storage::QR_COLORS.into(),
            privileged: qr::PRIVILEGED_ADDRESSES.iter().map(|a| a.to_string()).collect(),
            seed: None,
            max_attempts: crate::core::keys::generation::MAX_ATTEMPTS,
        }
    }
}

impl ColorConfig {
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self { self.storage_key = key.into(); self }
    pub fn with_privileged(mut self, addresses: Vec<String>) -> Self { self.privileged = addresses; self }
    pub fn with_seed(mut self, seed: u64) -> Self { self.seed = Some(seed); self }
    pub fn with_max_attempts(mut self, attempts: usize) -> Self { self.max_attempts = attempts; self }
}

/// BTC price cache configuration.
#[derive(Debug, Clone)]
pub struct PriceConfig {
    /// How long a fetched price stays fresh
    pub cache_ttl: Duration,
    /// Per-source request budget
    pub source_timeout: Duration,
    /// Price served before any fetch succeeds (EUR)
    pub initial_eur: f64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(price::CACHE_SECS),
            source_timeout: Duration::from_secs(price::SOURCE_TIMEOUT_SECS),
            initial_eur: price::DEFAULT_EUR,
        }
    }
}

impl PriceConfig {
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self { self.cache_ttl = ttl; self }
    pub fn with_source_timeout(mut self, timeout: Duration) -> Self { self.source_timeout = timeout; self }
    pub fn with_initial_eur(mut self, eur: f64) -> Self { self.initial_eur = eur; self }
}

/// Top-level configuration. Higher layers construct this.
#[derive(Debug, Clone)]
pub struct BtconConfig {
    pub app: String,
    pub data_dir: Option<PathBuf>,
    pub colors: ColorConfig,
    pub price: PriceConfig,
}

impl Default for BtconConfig {
    fn default() -> Self { Self::new("btcon") }
}

impl BtconConfig {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into(), data_dir: None, colors: ColorConfig::default(), price: PriceConfig::default() }
    }
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self { self.data_dir = Some(path.into()); self }
    pub fn with_colors(mut self, c: ColorConfig) -> Self { self.colors = c; self }
    pub fn with_price(mut self, c: PriceConfig) -> Self { self.price = c; self }

    /// Defaults overridden by `BTCON_APP`, `BTCON_DATA_DIR` and
    /// `BTCON_PRICE_TTL_SECS`. Empty or unparsable values are ignored.
    pub fn from_env() -> Self {
        let app = std::env::var(env::APP).ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "btcon".into());
        let mut config = Self::new(app);
        if let Some(dir) = std::env::var(env::DATA_DIR).ok().filter(|s| !s.is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(secs) = std::env::var(env::PRICE_TTL_SECS).ok().and_then(|s| s.trim().parse::<u64>().ok()) {
            config.price.cache_ttl = Duration::from_secs(secs);
        }
        config
    }

    /// Directory for durable records: explicit `data_dir`, else
    /// `<local data dir>/btcon/<app>`.
    #[cfg(feature = "native")]
    pub fn resolve_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("btcon")
                .join(&self.app),
        }
    }
}
