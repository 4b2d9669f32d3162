//! Price Tests: cached BTC/EUR quote feeding Btcon display strings
//!
//! 1. Display strings follow the cached price
//! 2. A failing source list keeps the last good price
//! 3. Env-configured ttl reaches the cache

use async_trait::async_trait;
use btcon::{format_btcon_with_euro, BtconConfig, PriceCache, PriceConfig, PriceSource};
use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Quotes a fixed price until switched off
struct Switchable {
    eur: f64,
    up: Arc<AtomicBool>,
}

#[async_trait]
impl PriceSource for Switchable {
    fn name(&self) -> &str { "switchable" }
    async fn fetch_eur(&self) -> anyhow::Result<f64> {
        if self.up.load(Ordering::SeqCst) {
            Ok(self.eur)
        } else {
            anyhow::bail!("source down")
        }
    }
}

/// Test: Display uses the fetched price
#[tokio::test]
async fn display_follows_fetched_price() {
    let up = Arc::new(AtomicBool::new(true));
    let cache = PriceCache::new(vec![Box::new(Switchable { eur: 50_000.0, up })], PriceConfig::default());

    assert_eq!(format_btcon_with_euro(150_000.0, cache.current()), "150000 Btcon (≈ 150.00 €)");
    let eur = cache.price().await;
    assert_eq!(format_btcon_with_euro(150_000.0, eur), "150000 Btcon (≈ 75.00 €)");
}

/// Test: Outage after a good fetch keeps serving the last good price
#[tokio::test]
async fn outage_keeps_last_good_price() {
    let up = Arc::new(AtomicBool::new(true));
    let config = PriceConfig::default().with_cache_ttl(Duration::ZERO);
    let cache = PriceCache::new(vec![Box::new(Switchable { eur: 64_000.0, up: up.clone() })], config);

    assert_eq!(cache.price().await, 64_000.0);
    up.store(false, Ordering::SeqCst);
    assert_eq!(cache.price().await, 64_000.0);
    assert_eq!(cache.current(), 64_000.0);
}

/// Test: BTCON_PRICE_TTL_SECS configures the cache period
#[test]
fn env_ttl_reaches_price_config() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());
    std::env::set_var("BTCON_PRICE_TTL_SECS", "5");
    let config = BtconConfig::from_env();
    std::env::remove_var("BTCON_PRICE_TTL_SECS");

    assert_eq!(config.price.cache_ttl, Duration::from_secs(5));
}
