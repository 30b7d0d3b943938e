//! The training-loop orchestrator.

use std::fmt;

use crate::cost::Cost;
use crate::error::Result;
use crate::layer::{BackpropResult, ForwardResult, Layer};
use crate::optimize::Optimizer;
use crate::regularize::Regularizer;
use crate::tensor::Tensor;

/// A feed-forward network: an ordered layer stack plus the cost function,
/// optimizer, and regularizer used to train it.
///
/// Training runs whole-batch epochs. Within one epoch, every layer runs
/// forward (retaining its cache), the cost gradient flows backward through
/// the stack, and only once every layer has produced a valid delta are the
/// parameter updates committed, so an error mid-epoch never leaves the
/// network partially updated.
///
/// # Example
///
/// ```
/// use tensornet::{Activation, Cost, FullyConnected, Layer, NeuralNetwork, Optimizer, Tensor};
///
/// let layers = vec![Layer::from(FullyConnected::new(Activation::Sigmoid, 1, 2).unwrap())];
/// let mut network = NeuralNetwork::new(layers, Cost::CrossEntropy, Optimizer::gradient_descent(0.1));
///
/// let features = Tensor::from_rows(&[vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
/// let labels = Tensor::from_rows(&[vec![0.0], vec![1.0]]).unwrap();
/// let costs = network.train(&features, &labels, 10).unwrap();
/// assert_eq!(costs.len(), 10);
/// ```
pub struct NeuralNetwork {
    layers: Vec<Layer>,
    cost: Cost,
    optimizer: Optimizer,
    regularizer: Regularizer,
}

impl NeuralNetwork {
    /// Build an unregularized network.
    pub fn new(layers: Vec<Layer>, cost: Cost, optimizer: Optimizer) -> Self {
        Self::with_regularizer(layers, cost, optimizer, Regularizer::none())
    }

    /// Build a network with an explicit regularizer.
    pub fn with_regularizer(
        layers: Vec<Layer>,
        cost: Cost,
        optimizer: Optimizer,
        regularizer: Regularizer,
    ) -> Self {
        Self {
            layers,
            cost,
            optimizer,
            regularizer,
        }
    }

    /// The layer stack, in forward order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Train on the whole batch for `epochs` epochs, returning the cost
    /// recorded at each epoch (data cost plus accumulated regularizer cost).
    ///
    /// On error the call aborts immediately; parameters remain as of the
    /// last epoch that completed.
    pub fn train(&mut self, features: &Tensor, labels: &Tensor, epochs: usize) -> Result<Vec<f64>> {
        let mut epoch_costs = Vec::with_capacity(epochs);
        let batch_size = features.shape()[0];

        for _ in 0..epochs {
            // Forward pass, retaining one cache per layer.
            let mut forward_results: Vec<ForwardResult> = Vec::with_capacity(self.layers.len());
            let mut activation = features.clone();
            for layer in &self.layers {
                let result = layer.forward(&activation, true)?;
                activation = result.activation.clone();
                forward_results.push(result);
            }

            // Backward pass in reverse order.
            let mut backprop_results: Vec<BackpropResult> = Vec::with_capacity(self.layers.len());
            let mut upstream = self.cost.derivative(&activation, labels)?;
            for (index, layer) in self.layers.iter().enumerate().rev() {
                let result = layer.backward(&upstream, &forward_results[index].cache)?;
                upstream = result.input_gradient.clone();
                backprop_results.push(result);
            }
            backprop_results.reverse();

            // Compute every delta before touching any parameter, so a
            // failure cannot leave the network half-updated.
            let mut deltas = Vec::with_capacity(self.layers.len());
            for (index, result) in backprop_results.iter().enumerate() {
                deltas.push(
                    self.optimizer
                        .compute_update(&result.parameter_gradients, index)?,
                );
            }
            for (layer, delta) in self.layers.iter_mut().zip(&deltas) {
                layer.apply_update(delta, &mut self.regularizer, batch_size)?;
            }

            let epoch_cost =
                self.cost.cost(&activation, labels)? + self.regularizer.running_cost();
            epoch_costs.push(epoch_cost);
            self.regularizer.reset_running_cost();
        }
        Ok(epoch_costs)
    }

    /// Run the forward pass in inference mode (dropout disabled).
    pub fn predict(&self, features: &Tensor) -> Result<Tensor> {
        let mut activation = features.clone();
        for layer in &self.layers {
            activation = layer.forward(&activation, false)?.activation;
        }
        Ok(activation)
    }

    /// Cost of the network's predictions against `labels`; the regularizer
    /// penalty is excluded.
    pub fn evaluate(&self, features: &Tensor, labels: &Tensor) -> Result<f64> {
        let predictions = self.predict(features)?;
        self.cost.cost(&predictions, labels)
    }
}

impl fmt::Display for NeuralNetwork {
    /// Layer-by-layer parameter dump for diagnostics.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, layer) in self.layers.iter().enumerate() {
            writeln!(f, "Layer {}:", index)?;
            write!(f, "{}", layer)?;
            if index != self.layers.len() - 1 {
                writeln!(f)?;
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
