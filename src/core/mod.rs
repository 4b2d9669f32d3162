//! Shared types and constants (no runtime dependencies)

pub mod color;
pub mod keys;

pub use color::{Hsl, QrColors};
