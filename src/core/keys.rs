//! Storage keys and fixed color constants
//!
//! Centralized registry for every durable key and reserved color.

/// Durable storage keys
pub mod storage {
    /// Single record holding the address -> color table
    pub const QR_COLORS: &str = "btcon_qr_color_assignments";
}

/// QR code colors
pub mod qr {
    /// Background used for every non-privileged address (and no address)
    pub const NEUTRAL_BACKGROUND: &str = "#FFFFFF";
    /// Foreground shown before a wallet is loaded
    pub const NEUTRAL_FOREGROUND: &str = "#000000";

    pub const PRIVILEGED_BACKGROUND: &str = "#0047AB";
    pub const PRIVILEGED_FOREGROUND: &str = "#FFD700";

    /// Developer addresses with a reserved cobalt/gold QR code
    pub const PRIVILEGED_ADDRESSES: &[&str] = &[
        "bc1qdff8680vyy0qthr5vpe3ywzw48r8rr4jn4jvac",
        "bc1qh78w8awednuw3336fnwcnr0sr4q5jxu980eyyd",
    ];
}

/// Random color generation bounds
pub mod generation {
    pub const MAX_ATTEMPTS: usize = 1000;

    pub const HUE_RANGE: std::ops::Range<u16> = 0..360;
    pub const SATURATION_RANGE: std::ops::Range<u8> = 50..80;
    pub const LIGHTNESS_RANGE: std::ops::Range<u8> = 35..60;

    pub const FALLBACK_SATURATION: u8 = 65;
    pub const FALLBACK_LIGHTNESS: u8 = 45;
}

/// BTC price defaults
pub mod price {
    /// Cached price before the first successful fetch (EUR)
    pub const DEFAULT_EUR: f64 = 100_000.0;
    pub const CACHE_SECS: u64 = 60;
    pub const SOURCE_TIMEOUT_SECS: u64 = 5;
    /// Btcon per BTC (1 Btcon = 1 sat)
    pub const BTCON_PER_BTC: f64 = 100_000_000.0;

    pub const COINGECKO_URL: &str =
        "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=eur";
    pub const COINBASE_URL: &str = "https://api.coinbase.com/v2/exchange-rates?currency=BTC";
}

/// Environment variables
pub mod env {
    pub const APP: &str = "BTCON_APP";
    pub const DATA_DIR: &str = "BTCON_DATA_DIR";
    pub const PRICE_TTL_SECS: &str = "BTCON_PRICE_TTL_SECS";
    pub const LOG_JSON: &str = "BTCON_LOG_JSON";
}
