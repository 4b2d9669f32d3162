//! Price - cached BTC/EUR quote for Btcon display
//!
//! # Fetch Policy
//!
//! ```text
//! price()
//!   │
//!   ├── fresh (age < ttl, > 0) → cached value
//!   │
//!   └── stale → sources in order, each under `source_timeout`
//!                 ├── first finite, positive rate → cache + publish
//!                 └── all failed                  → stale cached value
//! ```
//!
//! The cache never fails: before any successful fetch it serves
//! `PriceConfig::initial_eur`.

mod convert;
mod sources;

pub use convert::{btcon_to_euro, format_btcon_with_euro};
pub use sources::{is_valid_rate, parse_coinbase, parse_coingecko, PriceSource};
#[cfg(feature = "http")]
pub use sources::{default_sources, HttpSource};

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;

use crate::config::PriceConfig;

#[derive(Debug, Clone, Copy)]
struct Quote {
    eur: f64,
    fetched_at: Option<Instant>,
}

pub struct PriceCache {
    sources: Vec<Box<dyn PriceSource>>,
    config: PriceConfig,
    quote: Mutex<Quote>,
    latest: watch::Sender<f64>,
}

impl PriceCache {
    pub fn new(sources: Vec<Box<dyn PriceSource>>, config: PriceConfig) -> Self {
        let (latest, _) = watch::channel(config.initial_eur);
        let quote = Mutex::new(Quote { eur: config.initial_eur, fetched_at: None });
        Self { sources, config, quote, latest }
    }

    /// Cache backed by the public HTTP sources
    #[cfg(feature = "http")]
    pub fn with_default_sources(config: PriceConfig) -> Self {
        Self::new(default_sources(), config)
    }

    /// Last known price, no fetching
    pub fn current(&self) -> f64 { self.lock().eur }

    /// Receives every successfully fetched price
    pub fn subscribe(&self) -> watch::Receiver<f64> { self.latest.subscribe() }

    /// BTC price in EUR, refreshed when older than the cache ttl.
    pub async fn price(&self) -> f64 {
        let cached = *self.lock();
        if let Some(at) = cached.fetched_at {
            if at.elapsed() < self.config.cache_ttl && cached.eur > 0.0 {
                return cached.eur;
            }
        }

        let started = Instant::now();
        match self.fetch().await {
            Some(eur) => {
                *self.lock() = Quote { eur, fetched_at: Some(started) };
                self.latest.send_replace(eur);
                eur
            }
            None => {
                tracing::debug!(cached = cached.eur, "no price source answered, keeping cached price");
                cached.eur
            }
        }
    }

    async fn fetch(&self) -> Option<f64> {
        for source in &self.sources {
            match tokio::time::timeout(self.config.source_timeout, source.fetch_eur()).await {
                Ok(Ok(eur)) if is_valid_rate(eur) => {
                    tracing::debug!(source = source.name(), eur, "price fetched");
                    return Some(eur);
                }
                Ok(Ok(eur)) => tracing::debug!(source = source.name(), eur, "invalid rate"),
                Ok(Err(e)) => tracing::debug!(source = source.name(), error = %e, "price source failed"),
                Err(_) => tracing::debug!(source = source.name(), "price source timed out"),
            }
        }
        None
    }

    /// Refresh every ttl until shutdown. The first refresh runs immediately.
    pub fn spawn_refresher(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> tokio::task::JoinHandle<()> {
        let period = self.config.cache_ttl.max(std::time::Duration::from_millis(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = shutdown.recv() => break,
                    _ = ticker.tick() => {
                        let eur = self.price().await;
                        tracing::trace!(eur, "price refreshed");
                    }
                }
            }
        })
    }

    fn lock(&self) -> MutexGuard<'_, Quote> {
        self.quote.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
