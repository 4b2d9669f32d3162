//! QR colors - one stable, unique color per wallet address
//!
//! # Architecture
//!
//! ```text
//! QrColorService::resolve(address)          (sync, never fails)
//!     │
//!     ├── None / ""          → neutral pair
//!     ├── privileged address → fixed cobalt/gold pair
//!     ├── table / pending    → stored color
//!     └── miss → ColorAllocator::generate → pending buffer
//!                                   │
//!                                   ▼  FlushRequest::Merge (mpsc)
//!                             FlushWorker (single consumer)
//!                                   │  drains queue, one merge per batch
//!                                   ▼
//!                             PersistenceCache::save
//!                                   │
//!                                   ▼
//!                             KeyValueStore ("btcon_qr_color_assignments")
//! ```
//!
//! # Stored Record
//!
//! A flat JSON object, address to color string:
//!
//! ```json
//! {"bc1q...": "hsl(212, 63%, 41%)"}
//! ```
//!
//! # Failure Policy
//!
//! | Failure | Outcome |
//! |---------|---------|
//! | record missing or malformed | empty table, logged, ready anyway |
//! | write rejected | logged, in-memory table stays authoritative |
//! | 1000 collisions | time-derived hue, not checked for uniqueness |
//!
//! # Usage
//!
//! ```ignore
//! use btcon::{ColorConfig, MemoryStore, QrColorService};
//! use std::sync::Arc;
//!
//! let colors = QrColorService::start(Arc::new(MemoryStore::new()), &ColorConfig::default());
//! colors.wait_loaded().await?;
//! let qr = colors.resolve(Some("bc1q..."));
//! ```

mod allocator;
mod cache;
mod service;
mod state;

pub use allocator::{ColorAllocator, UsedColors};
pub use cache::{merge_into, AssignmentTable, PendingBuffer, PersistenceCache};
pub use service::{ColorError, FlushWorker, QrColorService};
pub use state::{ColorState, Resolution};
