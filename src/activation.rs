//! Activation functions and their cache-dependent derivatives.

use crate::error::{Error, Result};
use crate::tensor::Tensor;

/// Closed set of activation functions.
///
/// `apply` maps a pre-activation tensor to the layer output; `derivative`
/// folds an upstream gradient through the activation using the pre-activation
/// values cached by the forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Passes values through unchanged.
    Identity,
    /// `max(0, x)`.
    ReLU,
    /// Logistic function, squashing into (0, 1).
    Sigmoid,
    /// Row-wise normalized exponentials; rank-2 input only.
    Softmax,
    /// Hyperbolic tangent, squashing into (-1, 1).
    Tanh,
}

impl Activation {
    /// Apply the activation to `input`.
    ///
    /// Softmax normalizes each row (one example per row) and fails with a
    /// rank error for anything but rank-2 input; the other variants accept
    /// any tensor.
    pub fn apply(&self, input: &Tensor) -> Result<Tensor> {
        match self {
            Activation::Identity => Ok(input.clone()),
            Activation::ReLU => Ok(input.relu()),
            Activation::Sigmoid => Ok(input.sigmoid()),
            Activation::Softmax => {
                if input.rank() != 2 {
                    return Err(Error::RankMismatch {
                        op: "softmax",
                        expected: 2,
                        found: input.shape().to_vec(),
                    });
                }
                let exponentials = input.exp();
                let sums = exponentials.row_sum()?;
                exponentials.divide(&sums)
            }
            Activation::Tanh => Ok(input.tanh()),
        }
    }

    /// Chain `upstream` through the activation's derivative at the cached
    /// pre-activation values.
    ///
    /// Softmax and Tanh have no backward implementation and report an
    /// unsupported-operation error; don't substitute an invented Jacobian.
    pub fn derivative(&self, upstream: &Tensor, pre_activation: &Tensor) -> Result<Tensor> {
        match self {
            Activation::Identity => Ok(upstream.clone()),
            Activation::ReLU => {
                let mask = pre_activation.at_least(&Tensor::zero())?;
                upstream.multiply(&mask)
            }
            Activation::Sigmoid => {
                let sigma = pre_activation.sigmoid();
                let slope = sigma.multiply(&Tensor::one().subtract(&sigma)?)?;
                upstream.multiply(&slope)
            }
            Activation::Softmax => Err(Error::Unsupported(
                "softmax derivative is not implemented".to_string(),
            )),
            Activation::Tanh => Err(Error::Unsupported(
                "tanh derivative is not implemented".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_passthrough() {
        let t = Tensor::from_rows(&[vec![-1.0, 0.5]]).unwrap();
        assert_eq!(Activation::Identity.apply(&t).unwrap(), t);
    }

    #[test]
    fn test_sigmoid_range() {
        let t = Tensor::from_rows(&[vec![-50.0, -1.0, 0.0, 1.0, 50.0]]).unwrap();
        let s = Activation::Sigmoid.apply(&t).unwrap();
        assert!(s.values().iter().all(|&v| v > 0.0 && v < 1.0));
        assert!((s.values()[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_relu_clamps_negatives() {
        let t = Tensor::from_rows(&[vec![-2.0, 0.0, 3.0]]).unwrap();
        let r = Activation::ReLU.apply(&t).unwrap();
        assert_eq!(r.values(), &[0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_softmax_rows_sum_to_one() {
        let t = Tensor::from_rows(&[vec![1.0, 2.0, 3.0], vec![0.0, 0.0, 0.0]]).unwrap();
        let s = Activation::Softmax.apply(&t).unwrap();

        for i in 0..2 {
            let row_total: f64 = (0..3).map(|j| s.value(&[i, j]).unwrap()).sum();
            assert!((row_total - 1.0).abs() < 1e-12);
        }
        // Uniform logits give uniform probabilities.
        assert!((s.value(&[1, 0]).unwrap() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_softmax_rejects_rank4() {
        let t = Tensor::zeros(vec![1, 1, 2, 2]).unwrap();
        assert!(matches!(
            Activation::Softmax.apply(&t),
            Err(Error::RankMismatch { .. })
        ));
    }

    #[test]
    fn test_relu_derivative_masks_negative_preactivations() {
        let z = Tensor::from_rows(&[vec![-1.0, 0.0, 2.0]]).unwrap();
        let upstream = Tensor::from_rows(&[vec![5.0, 5.0, 5.0]]).unwrap();
        let grad = Activation::ReLU.derivative(&upstream, &z).unwrap();
        assert_eq!(grad.values(), &[0.0, 5.0, 5.0]);
    }

    #[test]
    fn test_sigmoid_derivative_peak_at_zero() {
        let z = Tensor::from_rows(&[vec![0.0]]).unwrap();
        let upstream = Tensor::one();
        let grad = Activation::Sigmoid.derivative(&upstream, &z).unwrap();
        assert!((grad.values()[0] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_unsupported_derivatives() {
        let z = Tensor::from_rows(&[vec![0.0]]).unwrap();
        let upstream = Tensor::one();
        assert!(matches!(
            Activation::Softmax.derivative(&upstream, &z),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            Activation::Tanh.derivative(&upstream, &z),
            Err(Error::Unsupported(_))
        ));
    }
}
