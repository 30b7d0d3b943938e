//! Dropout layer for regularization.

use std::cell::RefCell;
use std::fmt;

use crate::error::{Error, Result};
use crate::layer::{BackpropResult, ForwardResult, GradientMap, LayerCache};
use crate::tensor::Tensor;
use crate::utils::rng::{SimpleRng, DEFAULT_SEED};

/// Dropout layer with a fixed keep probability.
///
/// During training every element is kept with probability `p` and scaled by
/// `1/p` (inverted dropout), so the expected value of each output element
/// matches its input. During inference the layer is an identity map.
///
/// The mask source is a seeded [`SimpleRng`], so two layers built with the
/// same seed draw identical masks.
#[derive(Debug)]
pub struct Dropout {
    keep_probability: f64,
    rng: RefCell<SimpleRng>,
}

impl Dropout {
    /// Create a dropout layer with the default seed.
    ///
    /// `keep_probability` must lie in (0, 1].
    pub fn new(keep_probability: f64) -> Result<Self> {
        Self::with_seed(keep_probability, DEFAULT_SEED)
    }

    /// Create a dropout layer with an explicit mask seed.
    pub fn with_seed(keep_probability: f64, seed: u64) -> Result<Self> {
        if !(keep_probability > 0.0 && keep_probability <= 1.0) {
            return Err(Error::Construction(format!(
                "dropout keep probability must be in (0, 1], found {}",
                keep_probability
            )));
        }
        Ok(Self {
            keep_probability,
            rng: RefCell::new(SimpleRng::new(seed)),
        })
    }

    /// The probability of keeping any given element.
    pub fn keep_probability(&self) -> f64 {
        self.keep_probability
    }

    pub(crate) fn forward(&self, input: &Tensor, training: bool) -> Result<ForwardResult> {
        if !training {
            return Ok(ForwardResult {
                activation: input.clone(),
                cache: LayerCache::Dropout { mask: None },
            });
        }

        let multiplier = 1.0 / self.keep_probability;
        let mut rng = self.rng.borrow_mut();
        let values = input
            .values()
            .iter()
            .map(|_| {
                if rng.next_f64() < self.keep_probability {
                    multiplier
                } else {
                    0.0
                }
            })
            .collect();
        let mask = Tensor::new(input.shape().to_vec(), values)?;

        Ok(ForwardResult {
            activation: input.multiply(&mask)?,
            cache: LayerCache::Dropout { mask: Some(mask) },
        })
    }

    pub(crate) fn backward(&self, upstream: &Tensor, cache: &LayerCache) -> Result<BackpropResult> {
        let mask = match cache {
            LayerCache::Dropout { mask } => mask,
            _ => return Err(Error::CacheMismatch { expected: "dropout" }),
        };

        let input_gradient = match mask {
            Some(mask) => upstream.multiply(mask)?,
            // Inference-mode cache: the forward pass was an identity map.
            None => upstream.clone(),
        };

        Ok(BackpropResult {
            input_gradient,
            parameter_gradients: GradientMap::new(),
        })
    }
}

impl fmt::Display for Dropout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dropout Layer (keep probability {:.3})",
            self.keep_probability
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_probability_bounds() {
        assert!(Dropout::new(0.0).is_err());
        assert!(Dropout::new(-0.5).is_err());
        assert!(Dropout::new(1.5).is_err());
        assert!(Dropout::new(1.0).is_ok());
        assert!(Dropout::new(0.5).is_ok());
    }

    #[test]
    fn test_inference_is_identity() {
        let layer = Dropout::with_seed(0.5, 42).unwrap();
        let input = Tensor::from_rows(&[vec![1.0, 2.0, 3.0]]).unwrap();
        let result = layer.forward(&input, false).unwrap();

        assert_eq!(result.activation, input);
        assert!(matches!(result.cache, LayerCache::Dropout { mask: None }));
    }

    #[test]
    fn test_training_mask_values() {
        let layer = Dropout::with_seed(0.5, 42).unwrap();
        let input = Tensor::new(vec![1, 100], vec![1.0; 100]).unwrap();
        let result = layer.forward(&input, true).unwrap();

        // Every output is either dropped or scaled by exactly 1/p.
        for &v in result.activation.values() {
            assert!(v == 0.0 || (v - 2.0).abs() < 1e-12);
        }
        let kept = result
            .activation
            .values()
            .iter()
            .filter(|&&v| v != 0.0)
            .count();
        assert!(kept > 0 && kept < 100);
    }

    #[test]
    fn test_same_seed_same_mask() {
        let input = Tensor::new(vec![1, 50], vec![1.0; 50]).unwrap();
        let a = Dropout::with_seed(0.7, 9).unwrap().forward(&input, true).unwrap();
        let b = Dropout::with_seed(0.7, 9).unwrap().forward(&input, true).unwrap();
        assert_eq!(a.activation, b.activation);
    }

    #[test]
    fn test_backward_applies_cached_mask() {
        let layer = Dropout::with_seed(0.5, 42).unwrap();
        let input = Tensor::new(vec![1, 20], vec![1.0; 20]).unwrap();
        let forward = layer.forward(&input, true).unwrap();

        let upstream = Tensor::new(vec![1, 20], vec![1.0; 20]).unwrap();
        let result = layer.backward(&upstream, &forward.cache).unwrap();

        // Gradient flows exactly where the forward pass kept values.
        for (g, a) in result
            .input_gradient
            .values()
            .iter()
            .zip(forward.activation.values())
        {
            assert_eq!(*g == 0.0, *a == 0.0);
        }
        assert!(result.parameter_gradients.is_empty());
    }

    #[test]
    fn test_backward_with_inference_cache_passes_through() {
        let layer = Dropout::with_seed(0.5, 42).unwrap();
        let upstream = Tensor::from_rows(&[vec![1.0, 2.0]]).unwrap();
        let result = layer
            .backward(&upstream, &LayerCache::Dropout { mask: None })
            .unwrap();
        assert_eq!(result.input_gradient, upstream);
    }

    #[test]
    fn test_rank4_input_masked_per_element() {
        let layer = Dropout::with_seed(0.8, 3).unwrap();
        let input = Tensor::new(vec![2, 1, 2, 2], vec![1.0; 8]).unwrap();
        let result = layer.forward(&input, true).unwrap();
        assert_eq!(result.activation.shape(), &[2, 1, 2, 2]);
    }
}
