//! Heavy-tailed out-degree targets.
//!
//! Target out-degrees follow a log-normal distribution whose mean is
//! `avg_follows`: `mu = ln(max(1, avg_follows)) - sigma^2 / 2` with
//! `sigma = 1`. Most identities follow a handful of others; a few follow many.

use std::f64::consts::PI;

use crate::rng::RunRng;

const SIGMA: f64 = 1.0;
const MAX_OUT_FACTOR: f64 = 3.5;

/// Draws clamped log-normal out-degree targets for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegreeSampler {
    mu: f64,
    max_out: usize,
}

impl DegreeSampler {
    /// Sampler for a population of `n` identities.
    #[must_use]
    pub fn new(avg_follows: f64, n: usize) -> Self {
        Self {
            mu: avg_follows.max(1.0).ln() - 0.5 * SIGMA * SIGMA,
            max_out: max_out_per_user(avg_follows, n),
        }
    }

    /// Upper clamp applied to every draw.
    #[must_use]
    pub const fn max_out(&self) -> usize {
        self.max_out
    }

    /// Draw one target out-degree in `[1, max_out]`.
    ///
    /// Box-Muller over exactly two uniform draws, each mapped to `(0, 1]` so
    /// the logarithm stays finite.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn sample(&self, rng: &mut RunRng) -> usize {
        let u1 = 1.0 - rng.next_f64();
        let u2 = 1.0 - rng.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
        let value = (self.mu + SIGMA * z).exp();
        let upper = self.max_out.max(1) as f64;
        value.round_ties_even().clamp(1.0, upper) as usize
    }
}

/// `min(n - 1, max(1, round(avg_follows * 3.5)))`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn max_out_per_user(avg_follows: f64, n: usize) -> usize {
    let scaled = (avg_follows * MAX_OUT_FACTOR).round_ties_even();
    let scaled = if scaled.is_finite() && scaled > 1.0 {
        scaled.min(usize::MAX as f64) as usize
    } else {
        1
    };
    scaled.min(n.saturating_sub(1))
}
