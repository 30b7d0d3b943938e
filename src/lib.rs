//! A small from-scratch engine for training feed-forward neural networks.
//!
//! The crate is built around an immutable [`Tensor`] value type with
//! numpy-style broadcasting, a closed set of [`Layer`] kinds implementing a
//! forward/backward/update contract, and a [`NeuralNetwork`] orchestrator
//! that drives whole-batch training epochs with pluggable [`Cost`],
//! [`Optimizer`], and [`Regularizer`] rules.
//!
//! # Modules
//!
//! - `tensor`: dense rank-2/rank-4 tensors, broadcasting arithmetic, matrix
//!   kernels, seeded initializers
//! - `activation`: activation functions and their backward derivatives
//! - `cost`: batch cost functions (least squares, cross entropy)
//! - `layer`: fully connected, dropout, flatten, and pooling layers
//! - `regularize`: L1/L2 weight penalties with per-epoch cost accounting
//! - `optimize`: gradient descent, momentum, RMSProp, and Adam update rules
//! - `network`: the epoch loop (`train` / `predict` / `evaluate`)
//! - `architecture`: JSON layer-stack configuration
//!
//! # Example
//!
//! ```
//! use tensornet::{Activation, Cost, FullyConnected, Layer, NeuralNetwork, Optimizer, Tensor};
//!
//! // A single sigmoid unit separating points around the line x0 + 2*x1 = 3.
//! let layers = vec![Layer::from(FullyConnected::new(Activation::Sigmoid, 1, 2).unwrap())];
//! let optimizer = Optimizer::gradient_descent(0.12);
//! let mut network = NeuralNetwork::new(layers, Cost::CrossEntropy, optimizer);
//!
//! let features = Tensor::from_rows(&[vec![-5.0, -5.0], vec![5.0, 5.0]]).unwrap();
//! let labels = Tensor::from_rows(&[vec![0.0], vec![1.0]]).unwrap();
//!
//! let costs = network.train(&features, &labels, 50).unwrap();
//! assert!(costs[49] < costs[0]);
//! ```

pub mod activation;
pub mod architecture;
pub mod cost;
pub mod error;
pub mod layer;
pub mod network;
pub mod optimize;
pub mod regularize;
pub mod tensor;
pub mod utils;

pub use activation::Activation;
pub use cost::Cost;
pub use error::{Error, Result};
pub use layer::{
    BackpropResult, Dropout, Flatten, ForwardResult, FullyConnected, GradientMap, Layer,
    LayerCache, ParamName, Pool, PoolKind,
};
pub use network::NeuralNetwork;
pub use optimize::{Optimizer, OptimizerKind};
pub use regularize::{Regularizer, RegularizerKind};
pub use tensor::Tensor;
