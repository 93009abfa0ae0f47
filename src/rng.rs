use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Source of every random draw the engine makes.
///
/// Each draw is a unit value in `[0, 1)` that callers scale to the range they
/// need, so a scripted sequence can steer any decision in tests.
#[derive(Debug, Clone)]
pub struct TurnRng {
    source: RngSource,
}

#[derive(Debug, Clone)]
enum RngSource {
    Live(StdRng),
    Scripted { outcomes: Vec<f64>, index: usize },
}

impl TurnRng {
    /// A generator seeded from the operating system.
    pub fn new_random() -> Self {
        Self {
            source: RngSource::Live(StdRng::from_rng(&mut rand::rng())),
        }
    }

    /// A reproducible generator.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: RngSource::Live(StdRng::seed_from_u64(seed)),
        }
    }

    /// Replays `outcomes` in order. Values are clamped into `[0, 1)`.
    pub fn new_for_test(outcomes: Vec<f64>) -> Self {
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    /// Draws a unit value in `[0, 1)`.
    pub fn next_unit(&mut self, reason: &str) -> f64 {
        let outcome = match &mut self.source {
            RngSource::Live(rng) => rng.random::<f64>(),
            RngSource::Scripted { outcomes, index } => {
                if *index >= outcomes.len() {
                    // Scripted sequences are test fixtures; running dry is a fixture bug.
                    panic!(
                        "TurnRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                        reason
                    );
                }
                let value = outcomes[*index].clamp(0.0, 1.0 - f64::EPSILON);
                *index += 1;
                value
            }
        };
        debug!(reason, outcome, "rng consumed");
        outcome
    }

    /// True with probability `p`.
    pub fn chance(&mut self, p: f64, reason: &str) -> bool {
        self.next_unit(reason) < p
    }

    /// Uniform integer in `low..=high`.
    pub fn range_inclusive(&mut self, low: u32, high: u32, reason: &str) -> u32 {
        let span = f64::from(high - low + 1);
        let offset = (self.next_unit(reason) * span).floor() as u32;
        low + offset.min(high - low)
    }

    /// Uniform index into a collection of `len` items. `len` must be non-zero.
    pub fn index(&mut self, len: usize, reason: &str) -> usize {
        let picked = (self.next_unit(reason) * len as f64).floor() as usize;
        picked.min(len.saturating_sub(1))
    }

    /// Uniform real in `[0, upper)`.
    pub fn scaled(&mut self, upper: f64, reason: &str) -> f64 {
        self.next_unit(reason) * upper
    }
}
