//! Price sources - where BTC/EUR comes from

use async_trait::async_trait;
use serde_json::Value;

/// One upstream quote provider.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &str;
    /// BTC price in EUR. Any error moves the cache on to the next source.
    async fn fetch_eur(&self) -> anyhow::Result<f64>;
}

/// `{"bitcoin": {"eur": 61234.5}}`
pub fn parse_coingecko(data: &Value) -> Option<f64> {
    data.get("bitcoin")?.get("eur")?.as_f64()
}

/// `{"data": {"rates": {"EUR": "61234.5"}}}` (rates are strings)
pub fn parse_coinbase(data: &Value) -> Option<f64> {
    let rate = data.get("data")?.get("rates")?.get("EUR")?;
    match rate {
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

/// Usable quote: finite and strictly positive
pub fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

#[cfg(feature = "http")]
pub use http::{default_sources, HttpSource};

#[cfg(feature = "http")]
mod http {
    use super::*;
    use crate::core::keys::price::{COINBASE_URL, COINGECKO_URL};

    /// JSON-over-HTTPS source with a payload parser
    pub struct HttpSource {
        name: String,
        url: String,
        parse: fn(&Value) -> Option<f64>,
        client: reqwest::Client,
    }

    impl HttpSource {
        pub fn new(name: impl Into<String>, url: impl Into<String>, parse: fn(&Value) -> Option<f64>, client: reqwest::Client) -> Self {
            Self { name: name.into(), url: url.into(), parse, client }
        }

        pub fn coingecko(client: reqwest::Client) -> Self {
            Self::new("coingecko", COINGECKO_URL, parse_coingecko, client)
        }

        pub fn coinbase(client: reqwest::Client) -> Self {
            Self::new("coinbase", COINBASE_URL, parse_coinbase, client)
        }
    }

    #[async_trait]
    impl PriceSource for HttpSource {
        fn name(&self) -> &str { &self.name }

        async fn fetch_eur(&self) -> anyhow::Result<f64> {
            let response = self.client.get(&self.url).send().await?;
            if !response.status().is_success() {
                anyhow::bail!("{} returned {}", self.name, response.status());
            }
            let data: Value = response.json().await?;
            (self.parse)(&data).ok_or_else(|| anyhow::anyhow!("{}: no EUR rate in payload", self.name))
        }
    }

    /// CoinGecko first, Coinbase as fallback
    pub fn default_sources() -> Vec<Box<dyn PriceSource>> {
        let client = reqwest::Client::new();
        vec![
            Box::new(HttpSource::coingecko(client.clone())),
            Box::new(HttpSource::coinbase(client)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coingecko_payload() {
        assert_eq!(parse_coingecko(&json!({"bitcoin": {"eur": 61234.5}})), Some(61234.5));
        assert_eq!(parse_coingecko(&json!({"bitcoin": {"usd": 1.0}})), None);
        assert_eq!(parse_coingecko(&json!({"error": "rate limited"})), None);
    }

    #[test]
    fn coinbase_payload() {
        assert_eq!(parse_coinbase(&json!({"data": {"currency": "BTC", "rates": {"EUR": "58000.12"}}})), Some(58000.12));
        assert_eq!(parse_coinbase(&json!({"data": {"rates": {"EUR": 58000}}})), Some(58000.0));
        assert_eq!(parse_coinbase(&json!({"data": {"rates": {"EUR": "n/a"}}})), None);
        assert_eq!(parse_coinbase(&json!({"data": {}})), None);
    }

    #[test]
    fn rate_validity() {
        assert!(is_valid_rate(1.0));
        assert!(!is_valid_rate(0.0));
        assert!(!is_valid_rate(-5.0));
        assert!(!is_valid_rate(f64::NAN));
        assert!(!is_valid_rate(f64::INFINITY));
    }
}
