//! Simple random number generator for reproducibility.
//!
//! A lightweight xorshift-based PRNG that doesn't require external
//! dependencies, ensuring identical weight initializations and dropout masks
//! across runs for the same seed.

/// Default seed used by initializers and layers when the caller does not
/// supply one.
pub const DEFAULT_SEED: u64 = 2019;

/// Seeded xorshift PRNG with uniform and Gaussian sampling.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
    spare_gaussian: Option<f64>,
}

impl SimpleRng {
    /// Create a new RNG with explicit seed (if zero, use a fixed value).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self {
            state,
            spare_gaussian: None,
        }
    }

    /// Basic xorshift step.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform sample in [0, 1) with 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Standard normal sample via the Marsaglia polar method.
    ///
    /// Samples are produced in pairs; the second of each pair is cached and
    /// returned by the next call.
    pub fn next_gaussian(&mut self) -> f64 {
        if let Some(value) = self.spare_gaussian.take() {
            return value;
        }
        loop {
            let u = 2.0 * self.next_f64() - 1.0;
            let v = 2.0 * self.next_f64() - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let factor = (-2.0 * s.ln() / s).sqrt();
                self.spare_gaussian = Some(v * factor);
                return u * factor;
            }
        }
    }
}
