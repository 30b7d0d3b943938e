//! Seeded weight-initialization strategies.
//!
//! All initializers draw from a [`SimpleRng`] so the same seed always yields
//! the same tensor. Scaling follows the fan-in (row) dimension, since weight
//! matrices are laid out `input_dim x units`.

use crate::error::Result;
use crate::tensor::Tensor;
use crate::utils::rng::SimpleRng;

pub use crate::utils::rng::DEFAULT_SEED;

/// He initialization: zero-mean Gaussian with sigma = sqrt(2 / rows).
///
/// The usual choice in front of ReLU activations.
pub fn he(rows: usize, cols: usize, seed: u64) -> Result<Tensor> {
    gaussian(rows, cols, (2.0 / rows as f64).sqrt(), seed)
}

/// Xavier initialization: zero-mean Gaussian with sigma = sqrt(1 / rows).
pub fn xavier(rows: usize, cols: usize, seed: u64) -> Result<Tensor> {
    gaussian(rows, cols, (1.0 / rows as f64).sqrt(), seed)
}

/// Zero-mean Gaussian initialization with an explicit standard deviation.
pub fn gaussian(rows: usize, cols: usize, standard_deviation: f64, seed: u64) -> Result<Tensor> {
    let mut rng = SimpleRng::new(seed);
    let values = (0..rows * cols)
        .map(|_| rng.next_gaussian() * standard_deviation)
        .collect();
    Tensor::new(vec![rows, cols], values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_tensor() {
        let a = he(4, 3, 42).unwrap();
        let b = he(4, 3, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = he(4, 3, 1).unwrap();
        let b = he(4, 3, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_gaussian_scale() {
        // With sigma = 0 every draw collapses to zero.
        let t = gaussian(3, 3, 0.0, 7).unwrap();
        assert!(t.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(he(0, 3, DEFAULT_SEED).is_err());
    }
}
