//! Cost functions evaluated over a batch.
//!
//! Both cost functions treat rows as examples, so the averaging factor `m` is
//! the row count of the prediction. The derivative tensors deliberately drop
//! the `1/m` factor; the optimizer's learning rate absorbs the scale.

use crate::error::Result;
use crate::tensor::Tensor;

/// Closed set of batch cost functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cost {
    /// `0.5/m * sum((pred - truth)^2)`.
    LeastSquares,
    /// Binary cross entropy, `-1/m * sum(truth*ln(pred) + (1-truth)*ln(1-pred))`.
    ///
    /// Predictions at exactly 0 or 1 divide by zero in the derivative; this
    /// numeric edge is intentionally unguarded.
    CrossEntropy,
}

impl Cost {
    /// Scalar batch cost of `prediction` against `truth`.
    pub fn cost(&self, prediction: &Tensor, truth: &Tensor) -> Result<f64> {
        let m = prediction.shape()[0] as f64;
        match self {
            Cost::LeastSquares => {
                let difference = prediction.subtract(truth)?;
                let total = difference.multiply(&difference)?.sum();
                Ok(0.5 / m * total)
            }
            Cost::CrossEntropy => {
                let one_minus_prediction = Tensor::one().subtract(prediction)?;
                let one_minus_truth = Tensor::one().subtract(truth)?;
                let terms = truth
                    .multiply(&prediction.log())?
                    .add(&one_minus_truth.multiply(&one_minus_prediction.log())?)?;
                Ok(-1.0 / m * terms.sum())
            }
        }
    }

    /// Element-wise derivative of the cost with respect to the prediction.
    pub fn derivative(&self, prediction: &Tensor, truth: &Tensor) -> Result<Tensor> {
        match self {
            Cost::LeastSquares => prediction.subtract(truth),
            Cost::CrossEntropy => {
                let one_minus_prediction = Tensor::one().subtract(prediction)?;
                let one_minus_truth = Tensor::one().subtract(truth)?;
                one_minus_truth
                    .divide(&one_minus_prediction)?
                    .subtract(&truth.divide(prediction)?)
            }
        }
    }
}
