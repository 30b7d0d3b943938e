//! Gradient-based parameter-update rules.
//!
//! An [`Optimizer`] turns per-layer gradient maps into pre-negated deltas
//! (the amount to *add* to each parameter). Moving-average state is keyed by
//! the structured pair (layer index, [`ParamName`]) and lives as long as the
//! optimizer; it is never evicted.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::layer::{GradientMap, ParamName};
use crate::tensor::Tensor;

const EPSILON: f64 = 1.0e-8;

/// Which update rule to apply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptimizerKind {
    /// Plain gradient descent: `delta = -lr * g`.
    GradientDescent,
    /// Exponentially weighted gradient average: `v = beta*v + (1-beta)*g`,
    /// `delta = -lr * v`.
    Momentum { beta: f64 },
    /// Exponentially weighted squared-gradient average:
    /// `s = beta*s + (1-beta)*g^2`, `delta = -lr * g / (sqrt(s) + eps)`.
    RMSProp { beta: f64 },
    /// Momentum and RMSProp combined: `delta = -lr * v / (sqrt(s) + eps)`.
    ///
    /// No bias correction is applied, unlike canonical Adam. Together with
    /// variances decaying toward zero after approximate convergence this can
    /// destabilize long runs; that behavior is expected, not a bug.
    Adam { beta1: f64, beta2: f64 },
}

/// Stateful parameter-update rule shared by every layer of a network.
#[derive(Debug, Clone)]
pub struct Optimizer {
    kind: OptimizerKind,
    learning_rate: f64,
    momentums: HashMap<(usize, ParamName), Tensor>,
    variances: HashMap<(usize, ParamName), Tensor>,
}

impl Optimizer {
    /// Plain gradient descent.
    pub fn gradient_descent(learning_rate: f64) -> Self {
        Self::with_kind(OptimizerKind::GradientDescent, learning_rate)
    }

    /// Momentum optimizer. `beta` must lie in [0, 1]; around 0.9 is a
    /// reasonable default.
    pub fn momentum(learning_rate: f64, beta: f64) -> Result<Self> {
        check_beta(beta)?;
        Ok(Self::with_kind(
            OptimizerKind::Momentum { beta },
            learning_rate,
        ))
    }

    /// RMSProp optimizer. `beta` must lie in [0, 1]; around 0.999 is a
    /// reasonable default.
    pub fn rmsprop(learning_rate: f64, beta: f64) -> Result<Self> {
        check_beta(beta)?;
        Ok(Self::with_kind(
            OptimizerKind::RMSProp { beta },
            learning_rate,
        ))
    }

    /// Adam optimizer. Both betas must lie in [0, 1]; reasonable defaults
    /// are `beta1` ~ 0.9, `beta2` ~ 0.999.
    pub fn adam(learning_rate: f64, beta1: f64, beta2: f64) -> Result<Self> {
        check_beta(beta1)?;
        check_beta(beta2)?;
        Ok(Self::with_kind(
            OptimizerKind::Adam { beta1, beta2 },
            learning_rate,
        ))
    }

    fn with_kind(kind: OptimizerKind, learning_rate: f64) -> Self {
        Self {
            kind,
            learning_rate,
            momentums: HashMap::new(),
            variances: HashMap::new(),
        }
    }

    /// The base learning rate.
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Turn the gradients of the layer at `layer_index` into parameter
    /// deltas, updating any moving-average state along the way.
    ///
    /// The returned map uses the same keys as `gradients`; every delta is
    /// already negated.
    pub fn compute_update(
        &mut self,
        gradients: &GradientMap,
        layer_index: usize,
    ) -> Result<GradientMap> {
        let mut updates = GradientMap::new();
        let factor = Tensor::constant(-self.learning_rate);

        for (&name, gradient) in gradients {
            let key = (layer_index, name);
            let delta = match self.kind {
                OptimizerKind::GradientDescent => gradient.multiply(&factor)?,
                OptimizerKind::Momentum { beta } => {
                    let momentum = self.advance_momentum(key, gradient, beta)?;
                    momentum.multiply(&factor)?
                }
                OptimizerKind::RMSProp { beta } => {
                    let deviation = self.advance_variance(key, gradient, beta)?;
                    gradient.multiply(&factor)?.divide(&deviation)?
                }
                OptimizerKind::Adam { beta1, beta2 } => {
                    let momentum = self.advance_momentum(key, gradient, beta1)?;
                    let deviation = self.advance_variance(key, gradient, beta2)?;
                    momentum.multiply(&factor)?.divide(&deviation)?
                }
            };
            updates.insert(name, delta);
        }
        Ok(updates)
    }

    /// `v = beta*v + (1-beta)*g`, stored and returned.
    fn advance_momentum(
        &mut self,
        key: (usize, ParamName),
        gradient: &Tensor,
        beta: f64,
    ) -> Result<Tensor> {
        let previous = self
            .momentums
            .get(&key)
            .cloned()
            .unwrap_or_else(Tensor::zero);
        let momentum = previous
            .map(|v| beta * v)
            .add(&gradient.map(|g| (1.0 - beta) * g))?;
        self.momentums.insert(key, momentum.clone());
        Ok(momentum)
    }

    /// `s = beta*s + (1-beta)*g^2`, stored; returns `sqrt(s) + eps`.
    fn advance_variance(
        &mut self,
        key: (usize, ParamName),
        gradient: &Tensor,
        beta: f64,
    ) -> Result<Tensor> {
        let previous = self
            .variances
            .get(&key)
            .cloned()
            .unwrap_or_else(Tensor::zero);
        let variance = previous
            .map(|s| beta * s)
            .add(&gradient.map(|g| (1.0 - beta) * g * g))?;
        self.variances.insert(key, variance.clone());
        Ok(variance.map(|s| s.sqrt() + EPSILON))
    }
}

fn check_beta(beta: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&beta) {
        return Err(Error::Construction(format!(
            "beta parameters must be in [0, 1], found {}",
            beta
        )));
    }
    Ok(())
}
