//! Coin flip - "Pile ou Face" mini-game
//!
//! | Draw `r` | Outcome | Spins | Final rotation | Duration |
//! |----------|---------|-------|----------------|----------|
//! | `< 0.15` | Fallen | 3-4 | spins·360 + [0, 180) | 1500 ms |
//! | `< 0.575` | Heads | 5-7 | spins·360 | 2000 ms |
//! | otherwise | Tails | 5-7 | spins·360 + 180 | 2000 ms |
//!
//! A fallen coin rolls off the table and is hidden until the next flip.

use rand::Rng;
use serde::{Deserialize, Serialize};

const FALLEN_BELOW: f64 = 0.15;
const HEADS_BELOW: f64 = 0.575;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipOutcome {
    Heads,
    Tails,
    Fallen,
}

impl FlipOutcome {
    /// Map a uniform draw in [0, 1) to an outcome
    pub fn from_draw(r: f64) -> Self {
        if r < FALLEN_BELOW {
            FlipOutcome::Fallen
        } else if r < HEADS_BELOW {
            FlipOutcome::Heads
        } else {
            FlipOutcome::Tails
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlipOutcome::Heads => "heads",
            FlipOutcome::Tails => "tails",
            FlipOutcome::Fallen => "fallen",
        }
    }
}

/// Everything the renderer needs to animate one flip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlipPlan {
    pub outcome: FlipOutcome,
    pub spins: u32,
    pub rotation_deg: f64,
    pub duration_ms: u64,
}

impl FlipPlan {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let outcome = FlipOutcome::from_draw(rng.gen::<f64>());
        match outcome {
            FlipOutcome::Fallen => {
                let spins: u32 = rng.gen_range(3..5);
                let wobble = rng.gen::<f64>() * 180.0;
                Self { outcome, spins, rotation_deg: f64::from(spins) * 360.0 + wobble, duration_ms: 1500 }
            }
            FlipOutcome::Heads | FlipOutcome::Tails => {
                let spins: u32 = rng.gen_range(5..8);
                let face = if outcome == FlipOutcome::Tails { 180.0 } else { 0.0 };
                Self { outcome, spins, rotation_deg: f64::from(spins) * 360.0 + face, duration_ms: 2000 }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlipPhase {
    #[default]
    Idle,
    Flipping,
    Landed,
}

/// Screen state: one flip at a time.
#[derive(Debug, Clone, Default)]
pub struct CoinFlip {
    phase: FlipPhase,
    in_flight: Option<FlipPlan>,
    result: Option<FlipOutcome>,
    coin_visible: bool,
    has_flipped_once: bool,
}

impl CoinFlip {
    pub fn new() -> Self {
        Self { coin_visible: true, ..Default::default() }
    }

    /// Start a flip. `None` while a flip is already in the air.
    pub fn flip<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<FlipPlan> {
        if self.phase == FlipPhase::Flipping {
            return None;
        }
        let plan = FlipPlan::draw(rng);
        self.phase = FlipPhase::Flipping;
        self.in_flight = Some(plan);
        self.result = None;
        self.coin_visible = true;
        self.has_flipped_once = true;
        Some(plan)
    }

    /// Animation finished. Returns the outcome, `None` if nothing was flipping.
    pub fn land(&mut self) -> Option<FlipOutcome> {
        let plan = self.in_flight.take()?;
        self.phase = FlipPhase::Landed;
        self.result = Some(plan.outcome);
        self.coin_visible = plan.outcome != FlipOutcome::Fallen;
        Some(plan.outcome)
    }

    pub fn phase(&self) -> FlipPhase { self.phase }
    pub fn is_flipping(&self) -> bool { self.phase == FlipPhase::Flipping }
    pub fn result(&self) -> Option<FlipOutcome> { self.result }
    pub fn coin_visible(&self) -> bool { self.coin_visible }
    pub fn has_flipped_once(&self) -> bool { self.has_flipped_once }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn draw_thresholds() {
        assert_eq!(FlipOutcome::from_draw(0.0), FlipOutcome::Fallen);
        assert_eq!(FlipOutcome::from_draw(0.1499), FlipOutcome::Fallen);
        assert_eq!(FlipOutcome::from_draw(0.15), FlipOutcome::Heads);
        assert_eq!(FlipOutcome::from_draw(0.5749), FlipOutcome::Heads);
        assert_eq!(FlipOutcome::from_draw(0.575), FlipOutcome::Tails);
        assert_eq!(FlipOutcome::from_draw(0.9999), FlipOutcome::Tails);
    }

    #[test]
    fn plans_match_outcome() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..500 {
            let plan = FlipPlan::draw(&mut rng);
            let base = f64::from(plan.spins) * 360.0;
            match plan.outcome {
                FlipOutcome::Fallen => {
                    assert!((3..5).contains(&plan.spins));
                    assert!(plan.rotation_deg >= base && plan.rotation_deg < base + 180.0);
                    assert_eq!(plan.duration_ms, 1500);
                }
                FlipOutcome::Heads => {
                    assert!((5..8).contains(&plan.spins));
                    assert_eq!(plan.rotation_deg, base);
                    assert_eq!(plan.duration_ms, 2000);
                }
                FlipOutcome::Tails => {
                    assert!((5..8).contains(&plan.spins));
                    assert_eq!(plan.rotation_deg, base + 180.0);
                }
            }
        }
    }

    #[test]
    fn outcome_frequencies_are_plausible() {
        let mut rng = StdRng::seed_from_u64(99);
        let n = 20_000;
        let fallen = (0..n).filter(|_| FlipPlan::draw(&mut rng).outcome == FlipOutcome::Fallen).count();
        let share = fallen as f64 / n as f64;
        assert!((0.13..0.17).contains(&share), "fallen share {share}");
    }

    #[test]
    fn one_flip_at_a_time() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut game = CoinFlip::new();
        assert!(game.coin_visible());
        assert!(!game.has_flipped_once());
        assert!(game.land().is_none());

        let plan = game.flip(&mut rng).expect("first flip");
        assert!(game.is_flipping());
        assert!(game.flip(&mut rng).is_none());
        assert_eq!(game.result(), None);

        assert_eq!(game.land(), Some(plan.outcome));
        assert_eq!(game.phase(), FlipPhase::Landed);
        assert_eq!(game.result(), Some(plan.outcome));
        assert_eq!(game.coin_visible(), plan.outcome != FlipOutcome::Fallen);
        assert!(game.has_flipped_once());

        // Next flip brings the coin back.
        game.flip(&mut rng).expect("second flip");
        assert!(game.coin_visible());
        assert_eq!(game.result(), None);
    }

    #[test]
    fn outcome_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FlipOutcome::Fallen).unwrap(), r#""fallen""#);
        assert_eq!(FlipOutcome::Heads.as_str(), "heads");
    }
}
