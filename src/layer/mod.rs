//! Layer abstractions: the forward/backward/update contract and its
//! implementations.
//!
//! [`Layer`] is a closed sum over the four supported layer kinds. Each
//! variant owns its own learnable parameters (if any) and produces a typed
//! [`LayerCache`] during the forward pass which the matching backward call
//! consumes verbatim. A cache lives for exactly one forward/backward pair.

pub mod dropout;
pub mod flatten;
pub mod fully_connected;
pub mod pool;

pub use dropout::Dropout;
pub use flatten::Flatten;
pub use fully_connected::FullyConnected;
pub use pool::{Pool, PoolKind};

use std::collections::HashMap;
use std::fmt;

use crate::error::Result;
use crate::regularize::Regularizer;
use crate::tensor::Tensor;

/// Identifier of a learnable parameter within a layer.
///
/// Combined with a layer index this forms the structured key under which the
/// optimizer stores its moving-average state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamName {
    Weights,
    Bias,
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamName::Weights => write!(f, "weights"),
            ParamName::Bias => write!(f, "bias"),
        }
    }
}

/// Named parameter gradients or parameter updates for one layer.
pub type GradientMap = HashMap<ParamName, Tensor>;

/// Output of one layer's forward pass.
#[derive(Debug, Clone)]
pub struct ForwardResult {
    /// The layer's output activation, fed to the next layer.
    pub activation: Tensor,
    /// Intermediate values required by the matching backward call.
    pub cache: LayerCache,
}

/// Output of one layer's backward pass.
#[derive(Debug, Clone)]
pub struct BackpropResult {
    /// Gradient of the cost with respect to the layer's input, passed to the
    /// previous layer.
    pub input_gradient: Tensor,
    /// Gradients for each parameter the layer owns; empty for layers without
    /// parameters.
    pub parameter_gradients: GradientMap,
}

/// Per-variant forward-pass cache.
///
/// Typed per layer kind, so a backward pass either receives exactly the
/// values its forward pass stored or fails with a cache-mismatch error;
/// there is no string-keyed lookup to miss.
#[derive(Debug, Clone)]
pub enum LayerCache {
    /// Input and pre-activation values of a fully connected layer.
    FullyConnected { input: Tensor, pre_activation: Tensor },
    /// Scaled Bernoulli mask; `None` after an inference-mode forward pass.
    Dropout { mask: Option<Tensor> },
    /// The rank-4 shape flattened away by the forward pass.
    Flatten { original_shape: [usize; 4] },
    /// Original input of a max-pool forward pass, rescanned to locate
    /// window maxima.
    MaxPool { input: Tensor },
    /// Input shape of an average-pool forward pass.
    AveragePool { input_shape: [usize; 4] },
}

/// A neural network layer.
///
/// All variants implement the same three-step contract:
/// `forward` produces an activation plus cache, `backward` consumes the
/// cache and yields input/parameter gradients, and `apply_update` folds
/// optimizer deltas (and the regularizer penalty) into the parameters.
#[derive(Debug)]
pub enum Layer {
    FullyConnected(FullyConnected),
    Dropout(Dropout),
    Flatten(Flatten),
    Pool(Pool),
}

impl Layer {
    /// Run the layer forward on `input`.
    ///
    /// `training` selects training-time behavior; only Dropout
    /// distinguishes the two modes.
    pub fn forward(&self, input: &Tensor, training: bool) -> Result<ForwardResult> {
        match self {
            Layer::FullyConnected(layer) => layer.forward(input),
            Layer::Dropout(layer) => layer.forward(input, training),
            Layer::Flatten(layer) => layer.forward(input),
            Layer::Pool(layer) => layer.forward(input),
        }
    }

    /// Run the layer backward, consuming the cache produced by the matching
    /// forward call.
    pub fn backward(&self, upstream: &Tensor, cache: &LayerCache) -> Result<BackpropResult> {
        match self {
            Layer::FullyConnected(layer) => layer.backward(upstream, cache),
            Layer::Dropout(layer) => layer.backward(upstream, cache),
            Layer::Flatten(layer) => layer.backward(upstream, cache),
            Layer::Pool(layer) => layer.backward(upstream, cache),
        }
    }

    /// Fold pre-negated parameter deltas into the layer's parameters.
    ///
    /// `batch_size` is the row count of the epoch's training batch, used to
    /// scale the regularizer penalty. Layers without parameters ignore the
    /// call.
    pub fn apply_update(
        &mut self,
        deltas: &GradientMap,
        regularizer: &mut Regularizer,
        batch_size: usize,
    ) -> Result<()> {
        match self {
            Layer::FullyConnected(layer) => layer.apply_update(deltas, regularizer, batch_size),
            Layer::Dropout(_) | Layer::Flatten(_) | Layer::Pool(_) => Ok(()),
        }
    }
}

impl From<FullyConnected> for Layer {
    fn from(layer: FullyConnected) -> Self {
        Layer::FullyConnected(layer)
    }
}

impl From<Dropout> for Layer {
    fn from(layer: Dropout) -> Self {
        Layer::Dropout(layer)
    }
}

impl From<Flatten> for Layer {
    fn from(layer: Flatten) -> Self {
        Layer::Flatten(layer)
    }
}

impl From<Pool> for Layer {
    fn from(layer: Pool) -> Self {
        Layer::Pool(layer)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::FullyConnected(layer) => layer.fmt(f),
            Layer::Dropout(layer) => layer.fmt(f),
            Layer::Flatten(layer) => layer.fmt(f),
            Layer::Pool(layer) => layer.fmt(f),
        }
    }
}
