//! Fully connected (dense) layer.

use std::fmt;

use crate::activation::Activation;
use crate::error::{Error, Result};
use crate::layer::{BackpropResult, ForwardResult, GradientMap, LayerCache, ParamName};
use crate::regularize::Regularizer;
use crate::tensor::{init, Tensor};

/// Fully connected layer computing `a = activation(x * W + b)`.
///
/// Data points are organized into rows of the input, so `weights` has shape
/// `input_dim x units` (each column holds one unit's weights) and `bias` has
/// shape `1 x units`, broadcast over the batch.
///
/// # Example
///
/// ```
/// use tensornet::{Activation, FullyConnected};
///
/// let layer = FullyConnected::new(Activation::ReLU, 16, 8).unwrap();
/// assert_eq!(layer.weights().shape(), &[8, 16]);
/// assert_eq!(layer.bias().shape(), &[1, 16]);
/// ```
#[derive(Debug, Clone)]
pub struct FullyConnected {
    activation: Activation,
    weights: Tensor,
    bias: Tensor,
}

impl FullyConnected {
    /// Create a layer with He-initialized weights (default seed) and zero
    /// bias.
    pub fn new(activation: Activation, units: usize, input_dim: usize) -> Result<Self> {
        Self::with_seed(activation, units, input_dim, init::DEFAULT_SEED)
    }

    /// Create a layer with He-initialized weights drawn from an explicit
    /// seed and zero bias.
    pub fn with_seed(
        activation: Activation,
        units: usize,
        input_dim: usize,
        seed: u64,
    ) -> Result<Self> {
        Ok(Self {
            activation,
            weights: init::he(input_dim, units, seed)?,
            bias: Tensor::zeros(vec![1, units])?,
        })
    }

    /// Create a layer from explicit parameter tensors.
    pub fn from_parameters(activation: Activation, weights: Tensor, bias: Tensor) -> Result<Self> {
        if weights.rank() != 2 {
            return Err(Error::RankMismatch {
                op: "fully connected weights",
                expected: 2,
                found: weights.shape().to_vec(),
            });
        }
        if bias.rank() != 2 || bias.shape()[0] != 1 {
            return Err(Error::Construction(format!(
                "fully connected bias must have shape [1, units], found {:?}",
                bias.shape()
            )));
        }
        Ok(Self {
            activation,
            weights,
            bias,
        })
    }

    /// The weight matrix (`input_dim x units`).
    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    /// The bias row (`1 x units`).
    pub fn bias(&self) -> &Tensor {
        &self.bias
    }

    pub(crate) fn forward(&self, input: &Tensor) -> Result<ForwardResult> {
        if input.rank() != 2 {
            return Err(Error::RankMismatch {
                op: "fully connected forward",
                expected: 2,
                found: input.shape().to_vec(),
            });
        }
        let pre_activation = input.matrix_multiply(&self.weights)?.add(&self.bias)?;
        let activation = self.activation.apply(&pre_activation)?;

        Ok(ForwardResult {
            activation,
            cache: LayerCache::FullyConnected {
                input: input.clone(),
                pre_activation,
            },
        })
    }

    /// Backward pass.
    ///
    /// With `m` the batch row count:
    /// `dz = activation'(upstream, z)`, `dW = 1/m * x^T * dz`,
    /// `db = 1/m * column_sum(dz)`, and the gradient handed to the previous
    /// layer is `dz * W^T`.
    pub(crate) fn backward(&self, upstream: &Tensor, cache: &LayerCache) -> Result<BackpropResult> {
        let (input, pre_activation) = match cache {
            LayerCache::FullyConnected {
                input,
                pre_activation,
            } => (input, pre_activation),
            _ => {
                return Err(Error::CacheMismatch {
                    expected: "fully connected",
                })
            }
        };

        let dz = self.activation.derivative(upstream, pre_activation)?;
        let factor = Tensor::constant(1.0 / input.shape()[0] as f64);

        let weight_gradient = input.transpose()?.matrix_multiply(&dz)?.multiply(&factor)?;
        let bias_gradient = dz.column_sum()?.multiply(&factor)?;
        let input_gradient = dz.matrix_multiply(&self.weights.transpose()?)?;

        let mut parameter_gradients = GradientMap::new();
        parameter_gradients.insert(ParamName::Weights, weight_gradient);
        parameter_gradients.insert(ParamName::Bias, bias_gradient);

        Ok(BackpropResult {
            input_gradient,
            parameter_gradients,
        })
    }

    /// Add the pre-negated deltas to the parameters, shrinking the weights
    /// by the regularizer penalty.
    pub(crate) fn apply_update(
        &mut self,
        deltas: &GradientMap,
        regularizer: &mut Regularizer,
        batch_size: usize,
    ) -> Result<()> {
        let weight_delta = deltas
            .get(&ParamName::Weights)
            .ok_or(Error::MissingParameter("weights"))?;
        let bias_delta = deltas
            .get(&ParamName::Bias)
            .ok_or(Error::MissingParameter("bias"))?;

        let penalty = regularizer.penalty(&self.weights, batch_size);
        self.weights = self.weights.add(weight_delta)?.subtract(&penalty)?;
        self.bias = self.bias.add(bias_delta)?;
        Ok(())
    }
}

impl fmt::Display for FullyConnected {
    /// Parameters are printed transposed so each row shows one unit.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fully Connected Layer")?;
        writeln!(f, "Weights:")?;
        match self.weights.transpose() {
            Ok(t) => writeln!(f, "{}", t)?,
            Err(_) => writeln!(f, "<unprintable>")?,
        }
        writeln!(f, "Bias:")?;
        match self.bias.transpose() {
            Ok(t) => write!(f, "{}", t),
            Err(_) => write!(f, "<unprintable>"),
        }
    }
}
