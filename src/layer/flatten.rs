//! Flatten layer bridging rank-4 data into fully connected layers.

use std::fmt;

use crate::error::{Error, Result};
use crate::layer::{BackpropResult, ForwardResult, GradientMap, LayerCache};
use crate::tensor::Tensor;

/// Reshapes rank-4 input `(m, d1, d2, d3)` into rank-2 `(m, d1*d2*d3)`,
/// preserving the batch axis. The backward pass restores the cached shape.
#[derive(Debug, Clone, Default)]
pub struct Flatten;

impl Flatten {
    pub fn new() -> Self {
        Flatten
    }

    pub(crate) fn forward(&self, input: &Tensor) -> Result<ForwardResult> {
        if input.rank() != 4 {
            return Err(Error::RankMismatch {
                op: "flatten forward",
                expected: 4,
                found: input.shape().to_vec(),
            });
        }
        let shape = input.shape();
        let original_shape = [shape[0], shape[1], shape[2], shape[3]];
        let activation = input.reshape(vec![shape[0], shape[1] * shape[2] * shape[3]])?;

        Ok(ForwardResult {
            activation,
            cache: LayerCache::Flatten { original_shape },
        })
    }

    pub(crate) fn backward(&self, upstream: &Tensor, cache: &LayerCache) -> Result<BackpropResult> {
        let original_shape = match cache {
            LayerCache::Flatten { original_shape } => original_shape,
            _ => return Err(Error::CacheMismatch { expected: "flatten" }),
        };
        if upstream.rank() != 2 {
            return Err(Error::RankMismatch {
                op: "flatten backward",
                expected: 2,
                found: upstream.shape().to_vec(),
            });
        }

        Ok(BackpropResult {
            input_gradient: upstream.reshape(original_shape.to_vec())?,
            parameter_gradients: GradientMap::new(),
        })
    }
}

impl fmt::Display for Flatten {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flatten Layer")
    }
}
