//! ColorAllocator - random unique HSL colors

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

use crate::core::keys::generation as limits;
use crate::core::Hsl;

/// Colors already handed out during this process, plus those loaded from
/// storage. Never persisted itself.
#[derive(Debug, Clone, Default)]
pub struct UsedColors {
    colors: HashSet<String>,
}

impl UsedColors {
    pub fn new() -> Self { Self::default() }

    pub fn contains(&self, color: &str) -> bool { self.colors.contains(color) }

    /// Returns false if the color was already present
    pub fn insert(&mut self, color: impl Into<String>) -> bool { self.colors.insert(color.into()) }

    pub fn len(&self) -> usize { self.colors.len() }

    pub fn is_empty(&self) -> bool { self.colors.is_empty() }

    /// Seed from persisted assignments
    pub fn extend<I, S>(&mut self, colors: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.colors.extend(colors.into_iter().map(Into::into));
    }
}

/// Draws colors until one is unused.
///
/// After `max_attempts` collisions it falls back to a hue derived from the
/// wall clock. The fallback is recorded but not checked for uniqueness.
#[derive(Debug)]
pub struct ColorAllocator {
    used: UsedColors,
    rng: StdRng,
    max_attempts: usize,
}

impl Default for ColorAllocator {
    fn default() -> Self { Self::new() }
}

impl ColorAllocator {
    pub fn new() -> Self {
        Self { used: UsedColors::new(), rng: StdRng::from_entropy(), max_attempts: limits::MAX_ATTEMPTS }
    }

    /// Deterministic draws for reproducible sessions
    pub fn seeded(seed: u64) -> Self {
        Self { used: UsedColors::new(), rng: StdRng::seed_from_u64(seed), max_attempts: limits::MAX_ATTEMPTS }
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self { self.max_attempts = attempts; self }

    pub fn used(&self) -> &UsedColors { &self.used }

    pub fn used_mut(&mut self) -> &mut UsedColors { &mut self.used }

    pub fn generate(&mut self) -> String {
        for _ in 0..self.max_attempts {
            let color = Hsl::new(
                self.rng.gen_range(limits::HUE_RANGE),
                self.rng.gen_range(limits::SATURATION_RANGE),
                self.rng.gen_range(limits::LIGHTNESS_RANGE),
            )
            .to_string();

            if !self.used.contains(&color) {
                self.used.insert(color.clone());
                return color;
            }
        }

        let color = Self::fallback(chrono::Utc::now().timestamp_millis());
        tracing::warn!(attempts = self.max_attempts, %color, "color space exhausted, using time-derived hue");
        self.used.insert(color.clone());
        color
    }

    fn fallback(unix_millis: i64) -> String {
        let hue = unix_millis.rem_euclid(i64::from(limits::HUE_RANGE.end)) as u16;
        Hsl::new(hue, limits::FALLBACK_SATURATION, limits::FALLBACK_LIGHTNESS).to_string()
    }
}
