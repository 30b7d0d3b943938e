//! Parameter regularization penalties.
//!
//! A [`Regularizer`] produces the penalty tensor subtracted from a layer's
//! weights during each update and accumulates the corresponding scalar cost
//! over the epoch. The batch size is threaded through [`Regularizer::penalty`]
//! explicitly rather than set on the instance, so callers cannot get the
//! per-epoch ordering wrong.

use crate::tensor::Tensor;

/// Which penalty to apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegularizerKind {
    /// No penalty; contributes nothing to gradients or cost.
    None,
    /// L1 (lasso) penalty on the parameter magnitudes.
    L1 { learning_rate: f64, lambda: f64 },
    /// L2 (ridge) penalty on the squared parameter magnitudes.
    L2 { learning_rate: f64, lambda: f64 },
}

/// Stateful regularizer: a penalty rule plus the cost accumulated across all
/// layers of the current epoch.
#[derive(Debug, Clone)]
pub struct Regularizer {
    kind: RegularizerKind,
    running_cost: f64,
}

impl Regularizer {
    /// A regularizer that does nothing.
    pub fn none() -> Self {
        Self {
            kind: RegularizerKind::None,
            running_cost: 0.0,
        }
    }

    /// L1 regularizer with penalty factor `learning_rate * lambda / (2m)`.
    pub fn l1(learning_rate: f64, lambda: f64) -> Self {
        Self {
            kind: RegularizerKind::L1 {
                learning_rate,
                lambda,
            },
            running_cost: 0.0,
        }
    }

    /// L2 regularizer with penalty factor `learning_rate * lambda / m`.
    pub fn l2(learning_rate: f64, lambda: f64) -> Self {
        Self {
            kind: RegularizerKind::L2 {
                learning_rate,
                lambda,
            },
            running_cost: 0.0,
        }
    }

    /// Penalty tensor to subtract from `parameters`, with `batch_size` the
    /// row count of the epoch's training batch.
    ///
    /// As a side effect the scalar cost contribution is added to the running
    /// accumulator:
    /// L2 contributes `0.5 * (lr*lambda/m) * sum(W^2)`, L1 contributes
    /// `(lr*lambda/(2m)) * sum(|W|)`.
    pub fn penalty(&mut self, parameters: &Tensor, batch_size: usize) -> Tensor {
        let m = batch_size as f64;
        match self.kind {
            RegularizerKind::None => Tensor::zero(),
            RegularizerKind::L1 {
                learning_rate,
                lambda,
            } => {
                let factor = learning_rate * lambda / (2.0 * m);
                self.running_cost += factor * parameters.abs().sum();
                parameters.map(|w| {
                    if w > 0.0 {
                        factor
                    } else if w < 0.0 {
                        -factor
                    } else {
                        0.0
                    }
                })
            }
            RegularizerKind::L2 {
                learning_rate,
                lambda,
            } => {
                let factor = learning_rate * lambda / m;
                self.running_cost += 0.5 * factor * parameters.map(|w| w * w).sum();
                parameters.map(|w| factor * w)
            }
        }
    }

    /// Cost accumulated since the last reset.
    pub fn running_cost(&self) -> f64 {
        self.running_cost
    }

    /// Zero the accumulator; called once per epoch after the cost is read.
    pub fn reset_running_cost(&mut self) {
        self.running_cost = 0.0;
    }
}
