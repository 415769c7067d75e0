use rand::distributions::Standard;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pseudorandom stream owned by exactly one seed run.
///
/// Seeded runs are reproducible: the same seed and the same sequence of
/// calls always yield the same values. Unseeded runs draw their seed from
/// the operating system.
#[derive(Debug, Clone)]
pub struct RunRng {
    inner: StdRng,
}

impl RunRng {
    /// Create a stream from an explicit seed, or from OS entropy when `None`.
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let inner = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { inner }
    }

    /// Next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.inner.sample(Standard)
    }

    /// Next index in `[0, upper_exclusive)`.
    pub fn next_index(&mut self, upper_exclusive: usize) -> usize {
        if upper_exclusive == 0 {
            return 0;
        }
        self.inner.gen_range(0..upper_exclusive)
    }

    /// Bernoulli trial: `true` with probability `p`. Values outside `[0, 1]`
    /// behave like the nearest bound.
    ///
    /// Always consumes exactly one draw so the stream stays aligned no matter
    /// what `p` is.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}
