//! Btcon: wallet display services. QR colors, BTC price, coin flip.
//!
//! # Architecture
//!
//! ```text
//! App / CLI
//!   │
//!   ├── QrColorService (colors)
//!   │     ├── ColorState: table + pending buffer + ColorAllocator
//!   │     └── FlushWorker ── PersistenceCache ── KeyValueStore
//!   │                                              ├── MemoryStore
//!   │                                              └── FileStore
//!   │
//!   ├── PriceCache (price)
//!   │     └── PriceSource* (CoinGecko → Coinbase, `http` feature)
//!   │
//!   └── CoinFlip (coinflip)
//! ```
//!
//! # Features
//!
//! - `native` - filesystem store, data dir lookup, logging setup (default)
//! - `http` - CoinGecko / Coinbase price sources over reqwest
//!
//! # Usage
//!
//! ```ignore
//! use btcon::{BtconConfig, FileStore, QrColorService};
//! use std::sync::Arc;
//!
//! let config = BtconConfig::from_env();
//! let store = Arc::new(FileStore::open(config.resolve_data_dir()));
//! let colors = QrColorService::start(store, &config.colors);
//! colors.wait_loaded().await?;
//!
//! let qr = colors.resolve(Some("bc1q..."));
//! println!("{} on {}", qr.foreground, qr.background);
//! ```

// =============================================================================
// Shared modules
// =============================================================================
pub mod coinflip;
pub mod colors;
pub mod config;
pub mod core;
pub mod price;
pub mod runtime;
pub mod storage;

// =============================================================================
// Native-only modules
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;

// =============================================================================
// Re-exports
// =============================================================================
pub use coinflip::{CoinFlip, FlipOutcome, FlipPlan};
pub use colors::{ColorAllocator, ColorError, FlushWorker, PersistenceCache, QrColorService};
pub use config::{BtconConfig, ColorConfig, PriceConfig};
pub use crate::core::{Hsl, QrColors};
pub use price::{btcon_to_euro, format_btcon_with_euro, PriceCache, PriceSource};
pub use runtime::{install_signal_handlers, Shutdown};
pub use storage::{KeyValueStore, MemoryStore, StorageError};

#[cfg(feature = "native")]
pub use storage::FileStore;
